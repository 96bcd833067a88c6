//! Grid module - owns the tile and piece arenas
//!
//! Tiles and pieces live in two flat arrays, row-major (`y * width + x`),
//! with `y = 0` the bottom row. Pieces can only be created through
//! [`Grid::spawn`], which stamps them with a fresh [`PieceId`] and the cell
//! they occupy; every move goes through the grid so a piece's stored
//! coordinate always equals its slot.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CollectibleFlags, Coord, Direction, PieceColor, SpecialKind, TileKind};

/// Stable identity of a placed piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u64);

/// Blueprint for a piece; turned into a [`Piece`] by [`Grid::spawn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub color: PieceColor,
    #[serde(default)]
    pub special: SpecialKind,
    pub score: u32,
    /// Colour a colour bomb detonates on when caught in a clear
    #[serde(default)]
    pub target_color: Option<PieceColor>,
    #[serde(default)]
    pub collectible: Option<CollectibleFlags>,
}

impl PieceSpec {
    /// Ordinary matchable piece
    pub fn plain(color: PieceColor, score: u32) -> Self {
        Self {
            color,
            special: SpecialKind::None,
            score,
            target_color: None,
            collectible: None,
        }
    }

    /// Non-matchable collectible
    pub fn collectible(flags: CollectibleFlags, score: u32) -> Self {
        Self {
            color: PieceColor::None,
            special: SpecialKind::None,
            score,
            target_color: None,
            collectible: Some(flags),
        }
    }

    /// Bomb of the given kind
    pub fn bomb(special: SpecialKind, color: PieceColor, score: u32) -> Self {
        Self {
            color,
            special,
            score,
            target_color: None,
            collectible: None,
        }
    }
}

/// A piece placed on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    coord: Coord,
    spec: PieceSpec,
}

impl Piece {
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Cell the piece currently occupies
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn color(&self) -> PieceColor {
        self.spec.color
    }

    pub fn special(&self) -> SpecialKind {
        self.spec.special
    }

    pub fn score(&self) -> u32 {
        self.spec.score
    }

    pub fn target_color(&self) -> Option<PieceColor> {
        self.spec.target_color
    }

    pub fn collectible(&self) -> Option<CollectibleFlags> {
        self.spec.collectible
    }

    pub fn is_collectible(&self) -> bool {
        self.spec.collectible.is_some()
    }

    pub fn spec(&self) -> &PieceSpec {
        &self.spec
    }
}

/// Background tile of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    coord: Coord,
    kind: TileKind,
    durability: u32,
}

impl Tile {
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Remaining clears before a Breakable tile turns Normal (0 otherwise)
    pub fn durability(&self) -> u32 {
        self.durability
    }

    pub fn is_obstacle(&self) -> bool {
        self.kind == TileKind::Obstacle
    }
}

/// Placement failures surfaced to setup code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(Coord),
    #[error("cell {0} is an obstacle")]
    Obstacle(Coord),
    #[error("cell {0} already holds a piece")]
    Occupied(Coord),
}

impl GridError {
    pub fn code(&self) -> &'static str {
        match self {
            GridError::OutOfBounds(_) => "out_of_bounds",
            GridError::Obstacle(_) => "obstacle",
            GridError::Occupied(_) => "occupied",
        }
    }
}

/// Tile and piece arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    pieces: Vec<Option<Piece>>,
    next_id: u64,
}

impl Grid {
    /// Create an empty grid of Normal tiles
    ///
    /// Panics on a zero extent; configs are validated before a grid is built.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid extent must be non-zero");
        let tiles = (0..width * height)
            .map(|i| Tile {
                coord: Coord::new((i % width) as i32, (i / width) as i32),
                kind: TileKind::Normal,
                durability: 0,
            })
            .collect();
        Self {
            width,
            height,
            tiles,
            pieces: vec![None; width * height],
            next_id: 0,
        }
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x as usize >= self.width || c.y as usize >= self.height {
            return None;
        }
        Some(c.y as usize * self.width + c.x as usize)
    }

    /// Index of a cell that internal callers have already validated
    fn slot(&self, c: Coord) -> usize {
        match self.index(c) {
            Some(idx) => idx,
            None => panic!("cell {c} is outside the {}x{} grid", self.width, self.height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Longest possible ray: `max(width, height) - 1` steps
    pub fn max_ray_steps(&self) -> usize {
        self.width.max(self.height) - 1
    }

    pub fn is_within_bounds(&self, c: Coord) -> bool {
        self.index(c).is_some()
    }

    /// Manhattan distance exactly one along one axis
    pub fn adjacent(a: Coord, b: Coord) -> bool {
        a.is_adjacent(b)
    }

    /// In-bounds orthogonal neighbours
    pub fn neighbors(&self, c: Coord) -> ArrayVec<Coord, 4> {
        Direction::ALL
            .iter()
            .map(|&dir| c.step(dir))
            .filter(|&n| self.is_within_bounds(n))
            .collect()
    }

    /// Every coordinate, column by column from the bottom-left
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let height = self.height as i32;
        (0..self.width as i32).flat_map(move |x| (0..height).map(move |y| Coord::new(x, y)))
    }

    /// Coordinates of one column, bottom to top
    pub fn column(&self, x: i32) -> impl Iterator<Item = Coord> {
        (0..self.height as i32).map(move |y| Coord::new(x, y))
    }

    /// Coordinates of one row, left to right
    pub fn row(&self, y: i32) -> impl Iterator<Item = Coord> {
        (0..self.width as i32).map(move |x| Coord::new(x, y))
    }

    pub fn tile(&self, c: Coord) -> Option<&Tile> {
        self.index(c).map(|idx| &self.tiles[idx])
    }

    /// Set a tile's kind and durability.
    ///
    /// Fails with `Occupied` if an Obstacle would cover a piece. A Breakable
    /// tile with zero durability is stored as Normal.
    pub fn set_tile(
        &mut self,
        c: Coord,
        kind: TileKind,
        durability: u32,
    ) -> Result<(), GridError> {
        let idx = self.index(c).ok_or(GridError::OutOfBounds(c))?;
        if kind == TileKind::Obstacle && self.pieces[idx].is_some() {
            return Err(GridError::Occupied(c));
        }
        let (kind, durability) = match kind {
            TileKind::Breakable if durability > 0 => (TileKind::Breakable, durability),
            TileKind::Breakable | TileKind::Normal => (TileKind::Normal, 0),
            TileKind::Obstacle => (TileKind::Obstacle, 0),
        };
        self.tiles[idx].kind = kind;
        self.tiles[idx].durability = durability;
        Ok(())
    }

    pub fn is_obstacle(&self, c: Coord) -> bool {
        self.tile(c).is_some_and(Tile::is_obstacle)
    }

    /// In bounds, not an Obstacle, and holding no piece
    pub fn is_open(&self, c: Coord) -> bool {
        match self.index(c) {
            Some(idx) => !self.tiles[idx].is_obstacle() && self.pieces[idx].is_none(),
            None => false,
        }
    }

    /// Record one clear above a tile.
    ///
    /// Breakable tiles lose one durability and turn Normal at zero. Returns the
    /// remaining durability of a tile that was Breakable, `None` otherwise.
    pub fn damage_tile(&mut self, c: Coord) -> Option<u32> {
        let idx = self.slot(c);
        let tile = &mut self.tiles[idx];
        if tile.kind != TileKind::Breakable {
            return None;
        }
        tile.durability = tile.durability.saturating_sub(1);
        if tile.durability == 0 {
            tile.kind = TileKind::Normal;
        }
        Some(tile.durability)
    }

    pub fn piece(&self, c: Coord) -> Option<&Piece> {
        self.index(c).and_then(|idx| self.pieces[idx].as_ref())
    }

    /// Place a new piece and return its id
    pub fn spawn(&mut self, c: Coord, spec: PieceSpec) -> Result<PieceId, GridError> {
        let idx = self.index(c).ok_or(GridError::OutOfBounds(c))?;
        if self.tiles[idx].is_obstacle() {
            return Err(GridError::Obstacle(c));
        }
        if self.pieces[idx].is_some() {
            return Err(GridError::Occupied(c));
        }
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces[idx] = Some(Piece { id, coord: c, spec });
        Ok(id)
    }

    /// Remove and return the piece at `c`.
    ///
    /// Panics if `c` is out of bounds or an Obstacle.
    pub fn take(&mut self, c: Coord) -> Option<Piece> {
        let idx = self.slot(c);
        assert!(!self.tiles[idx].is_obstacle(), "clearing obstacle cell {c}");
        self.pieces[idx].take()
    }

    /// Exchange the pieces of two cells, keeping their coordinates in sync
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let ia = self.slot(a);
        let ib = self.slot(b);
        self.pieces.swap(ia, ib);
        if let Some(piece) = self.pieces[ia].as_mut() {
            piece.coord = a;
        }
        if let Some(piece) = self.pieces[ib].as_mut() {
            piece.coord = b;
        }
    }

    /// Move a piece into an open cell.
    ///
    /// Panics if either cell is out of bounds, `to` is not open, or `from` is empty.
    pub fn move_piece(&mut self, from: Coord, to: Coord) -> PieceId {
        assert!(self.is_open(to), "move target {to} is not an open cell");
        let from_idx = self.slot(from);
        let to_idx = self.slot(to);
        let mut piece = match self.pieces[from_idx].take() {
            Some(piece) => piece,
            None => panic!("no piece to move at {from}"),
        };
        piece.coord = to;
        let id = piece.id;
        self.pieces[to_idx] = Some(piece);
        id
    }

    /// Colour bomb adoption: the piece takes `color` and, if it is a colour
    /// bomb, targets it
    pub fn adopt_color(&mut self, c: Coord, color: PieceColor) -> bool {
        match self.index(c).and_then(|idx| self.pieces[idx].as_mut()) {
            Some(piece) => {
                piece.spec.color = color;
                if piece.spec.special == SpecialKind::ColorClear {
                    piece.spec.target_color = Some(color);
                }
                true
            }
            None => false,
        }
    }

    /// Coordinates of every piece satisfying `pred`, column-major
    pub fn find(&self, pred: impl Fn(&Piece) -> bool) -> Vec<Coord> {
        self.coords()
            .filter(|&c| self.piece(c).is_some_and(&pred))
            .collect()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_some()).count()
    }

    /// Empty cells that can hold a piece
    pub fn open_cells(&self) -> Vec<Coord> {
        self.coords().filter(|&c| self.is_open(c)).collect()
    }

    /// Remove every piece, returning them; tiles are left untouched
    pub fn clear_pieces(&mut self) -> Vec<Piece> {
        self.pieces.iter_mut().filter_map(Option::take).collect()
    }
}

impl fmt::Display for Grid {
    /// One character per cell, top row first: palette letters, bomb
    /// symbols, `$` collectibles, `#` obstacles and `.` empty cells.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height as i32).rev() {
            for c in self.row(y) {
                let symbol = match (self.piece(c), self.is_obstacle(c)) {
                    (Some(piece), _) => piece
                        .special()
                        .symbol()
                        .unwrap_or_else(|| piece.color().symbol()),
                    (None, true) => '#',
                    (None, false) => '.',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
