//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! Everything here is plain data: coordinates, directions, piece colours,
//! special kinds and tile kinds, plus the default tuning constants.
//!
//! # Coordinates
//!
//! Cells are addressed as `(x, y)` with `0 <= x < width` and `0 <= y < height`.
//! Row `y = 0` is the **bottom** of the board: gravity pulls pieces towards it
//! and refill enters from the top row.
//!
//! # Default Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 8 | Board columns |
//! | `DEFAULT_HEIGHT` | 8 | Board rows |
//! | `DEFAULT_MIN_MATCH` | 3 | Smallest accepted match |
//! | `DEFAULT_PIECE_SCORE` | 20 | Points per cleared piece before the multiplier |
//! | `DEFAULT_COLLECTIBLE_CHANCE` | 0.1 | Chance a top-row refill spawns a collectible |
//! | `DEFAULT_MAX_COLLECTIBLES` | 3 | Live collectible cap |
//! | `REFILL_RETRY_LIMIT` | 100 | Re-rolls before a matching refill is accepted |
//! | `BLAST_PASSES` | 2 | Bomb expansion passes per cascade iteration |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds and only pace the presentation:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SWAP_SETTLE_MS` | 500 | Wait after a swap is issued |
//! | `CASCADE_PAUSE_MS` | 100 | Pause between cascade phases |
//! | `DEADLOCK_PAUSE_MS` | 1000 | Pause around a deadlock reshuffle |
//! | `FALL_MS_PER_CELL` | 100 | Fall duration per cell travelled |
//! | `FILL_MOVE_MS` | 500 | Drop-in duration of refilled pieces |
//! | `TICK_MS` | 16 | Arrival polling interval |
//!
//! # Examples
//!
//! ```
//! use tile_cascade_types::{Coord, Direction, PieceColor};
//!
//! let c = Coord::new(2, 0);
//! assert_eq!(c.step(Direction::Up), Coord::new(2, 1));
//! assert!(c.is_adjacent(Coord::new(3, 0)));
//!
//! assert!(PieceColor::Red.matches(PieceColor::Wild));
//! assert!(!PieceColor::None.matches(PieceColor::None));
//! assert_eq!(PieceColor::from_str("red"), Some(PieceColor::Red));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_WIDTH: usize = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: usize = 8;

/// Smallest run accepted as a match
pub const DEFAULT_MIN_MATCH: usize = 3;

/// Each ray of an axis match needs the start piece plus one neighbour
pub const RAY_MIN_RUN: usize = 2;

/// Points awarded for an ordinary piece before the cascade multiplier
pub const DEFAULT_PIECE_SCORE: u32 = 20;

/// Chance that a top-row refill spawns a collectible
pub const DEFAULT_COLLECTIBLE_CHANCE: f32 = 0.1;

/// Maximum number of collectibles alive at once
pub const DEFAULT_MAX_COLLECTIBLES: usize = 3;

/// Re-rolls attempted before a matching refill piece is accepted
pub const REFILL_RETRY_LIMIT: u32 = 100;

/// Bomb expansion passes per cascade iteration.
///
/// Bombs first reached on the last pass are cleared but not expanded; they
/// chain on the next iteration instead.
pub const BLAST_PASSES: usize = 2;

/// Settle delay after a swap (and after a revert)
pub const SWAP_SETTLE_MS: u64 = 500;

/// Pacing pause between cascade phases
pub const CASCADE_PAUSE_MS: u64 = 100;

/// Pause before and after a deadlock reshuffle
pub const DEADLOCK_PAUSE_MS: u64 = 1000;

/// Fall duration per travelled cell
pub const FALL_MS_PER_CELL: u64 = 100;

/// Duration of the drop-in move for refilled pieces
pub const FILL_MOVE_MS: u64 = 500;

/// Rows above its cell a refilled piece starts its drop-in move from
pub const FILL_DROP_ROWS: i32 = 10;

/// Arrival polling interval (16ms ≈ 60 FPS)
pub const TICK_MS: u64 = 16;

/// Give up waiting on a piece that never reports arrival
pub const ARRIVAL_TIMEOUT_MS: u64 = 5000;

/// A cell coordinate; `y = 0` is the bottom row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate one step in `dir` (may be off the board)
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance is exactly one
    pub fn is_adjacent(self, other: Coord) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    /// Chebyshev distance, used by the 3x3 blast
    pub fn chebyshev(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Board axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Axis joining two adjacent cells
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::{Axis, Coord};
    ///
    /// assert_eq!(Axis::between(Coord::new(0, 0), Coord::new(1, 0)), Axis::Horizontal);
    /// assert_eq!(Axis::between(Coord::new(0, 0), Coord::new(0, 1)), Axis::Vertical);
    /// ```
    pub fn between(a: Coord, b: Coord) -> Self {
        if a.y == b.y {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// The two opposite ray directions along this axis, negative side first
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::Horizontal => [Direction::Left, Direction::Right],
            Axis::Vertical => [Direction::Down, Direction::Up],
        }
    }
}

/// Unit step along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(dx, dy)`; up increases `y`
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Piece colour.
///
/// The ten named colours form the palette. `None` marks pieces that never
/// match (collectibles); `Wild` matches any palette colour and is carried by
/// colour bombs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    Blue,
    Cyan,
    Green,
    Indigo,
    Magenta,
    Orange,
    Purple,
    Red,
    Teal,
    Yellow,
    None,
    Wild,
}

impl PieceColor {
    /// Every matchable palette colour
    pub const PALETTE: [PieceColor; 10] = [
        PieceColor::Blue,
        PieceColor::Cyan,
        PieceColor::Green,
        PieceColor::Indigo,
        PieceColor::Magenta,
        PieceColor::Orange,
        PieceColor::Purple,
        PieceColor::Red,
        PieceColor::Teal,
        PieceColor::Yellow,
    ];

    /// Palette used when a board config does not name one
    pub const DEFAULT_PALETTE: [PieceColor; 6] = [
        PieceColor::Red,
        PieceColor::Green,
        PieceColor::Blue,
        PieceColor::Yellow,
        PieceColor::Purple,
        PieceColor::Orange,
    ];

    /// True for palette colours and `Wild`
    pub fn is_matchable(self) -> bool {
        self != PieceColor::None
    }

    /// Colour compatibility used by ray scans.
    ///
    /// `None` never matches (not even itself); `Wild` matches any matchable colour.
    pub fn matches(self, other: PieceColor) -> bool {
        if !self.is_matchable() || !other.is_matchable() {
            return false;
        }
        self == other || self == PieceColor::Wild || other == PieceColor::Wild
    }

    /// Parse colour from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::PieceColor;
    ///
    /// assert_eq!(PieceColor::from_str("Teal"), Some(PieceColor::Teal));
    /// assert_eq!(PieceColor::from_str("wild"), Some(PieceColor::Wild));
    /// assert_eq!(PieceColor::from_str("mauve"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(PieceColor::Blue),
            "cyan" => Some(PieceColor::Cyan),
            "green" => Some(PieceColor::Green),
            "indigo" => Some(PieceColor::Indigo),
            "magenta" => Some(PieceColor::Magenta),
            "orange" => Some(PieceColor::Orange),
            "purple" => Some(PieceColor::Purple),
            "red" => Some(PieceColor::Red),
            "teal" => Some(PieceColor::Teal),
            "yellow" => Some(PieceColor::Yellow),
            "none" => Some(PieceColor::None),
            "wild" => Some(PieceColor::Wild),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceColor::Blue => "blue",
            PieceColor::Cyan => "cyan",
            PieceColor::Green => "green",
            PieceColor::Indigo => "indigo",
            PieceColor::Magenta => "magenta",
            PieceColor::Orange => "orange",
            PieceColor::Purple => "purple",
            PieceColor::Red => "red",
            PieceColor::Teal => "teal",
            PieceColor::Yellow => "yellow",
            PieceColor::None => "none",
            PieceColor::Wild => "wild",
        }
    }

    /// One-character board notation
    ///
    /// Palette colours use their initial letter, except `magenta` (`m`) and
    /// `teal` (`t`) which would collide otherwise.
    pub fn symbol(&self) -> char {
        match self {
            PieceColor::Blue => 'b',
            PieceColor::Cyan => 'c',
            PieceColor::Green => 'g',
            PieceColor::Indigo => 'i',
            PieceColor::Magenta => 'm',
            PieceColor::Orange => 'o',
            PieceColor::Purple => 'p',
            PieceColor::Red => 'r',
            PieceColor::Teal => 't',
            PieceColor::Yellow => 'y',
            PieceColor::None => '$',
            PieceColor::Wild => '*',
        }
    }

    /// Inverse of [`symbol`](Self::symbol) for palette colours
    pub fn from_symbol(symbol: char) -> Option<Self> {
        PieceColor::PALETTE
            .iter()
            .copied()
            .find(|color| color.symbol() == symbol)
    }
}

/// Special effect carried by a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialKind {
    #[default]
    None,
    /// Clears the bomb's whole row
    RowClear,
    /// Clears the bomb's whole column
    ColumnClear,
    /// Clears the 3x3 block around the bomb
    AdjacentClear,
    /// Clears every piece of one colour
    ColorClear,
}

impl SpecialKind {
    pub fn is_bomb(self) -> bool {
        self != SpecialKind::None
    }

    /// Board notation used when the piece is a bomb
    pub fn symbol(&self) -> Option<char> {
        match self {
            SpecialKind::None => None,
            SpecialKind::RowClear => Some('-'),
            SpecialKind::ColumnClear => Some('|'),
            SpecialKind::AdjacentClear => Some('+'),
            SpecialKind::ColorClear => Some('*'),
        }
    }
}

/// Background tile kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    #[default]
    Normal,
    /// Degrades by one durability per clear above it, then turns Normal
    Breakable,
    /// Never holds a piece
    Obstacle,
}

/// Removal rules of a collectible piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollectibleFlags {
    /// Removed once it rests in row 0
    #[serde(default)]
    pub cleared_at_bottom: bool,
    /// May be destroyed as bomb collateral
    #[serde(default)]
    pub cleared_by_bomb: bool,
}
