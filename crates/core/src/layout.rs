//! Board authoring - seeded tiles and pieces applied at setup
//!
//! A layout lists tile seeds and piece seeds; cells it leaves empty are
//! filled by the first refill. Layouts are usually loaded from JSON level
//! files, or written inline with [`Layout::from_rows`]:
//!
//! | symbol | cell |
//! |--------|------|
//! | `r g b y p o c i m t` | plain piece of that colour |
//! | `*` | colour bomb |
//! | `$` | collectible removed at the bottom row |
//! | `&` | collectible removed at the bottom row or by bombs |
//! | `#` | obstacle tile |
//! | `.` | empty |
//!
//! Rows are written top row first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BoardConfig, ConfigError};
use crate::grid::{Grid, GridError, PieceSpec};
use crate::types::{CollectibleFlags, Coord, PieceColor, SpecialKind, TileKind};

/// Tile placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSeed {
    pub kind: TileKind,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub durability: u32,
}

/// Piece placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSeed {
    pub color: PieceColor,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub special: SpecialKind,
    /// Falls back to the board's piece score
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub collectible: Option<CollectibleFlags>,
}

impl PieceSeed {
    pub fn plain(color: PieceColor, x: i32, y: i32) -> Self {
        Self {
            color,
            x,
            y,
            special: SpecialKind::None,
            score: None,
            collectible: None,
        }
    }

    fn spec(&self, default_score: u32) -> PieceSpec {
        PieceSpec {
            color: self.color,
            special: self.special,
            score: self.score.unwrap_or(default_score),
            target_color: None,
            collectible: self.collectible,
        }
    }
}

/// Seeded placements for one board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub tiles: Vec<TileSeed>,
    pub pieces: Vec<PieceSeed>,
}

/// A level file: board rules plus layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Level {
    pub config: BoardConfig,
    pub layout: Layout,
}

/// Setup failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("unknown board symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
    #[error("layout rows must be non-empty and of equal width")]
    RaggedRows,
}

impl SetupError {
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::Config(err) => err.code(),
            SetupError::Grid(err) => err.code(),
            SetupError::UnknownSymbol { .. } => "unknown_symbol",
            SetupError::RaggedRows => "ragged_rows",
        }
    }
}

impl Layout {
    /// Parse a text board, top row first
    pub fn from_rows(rows: &[&str]) -> Result<Self, SetupError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 || rows.iter().any(|row| row.chars().count() != width) {
            return Err(SetupError::RaggedRows);
        }

        let height = rows.len();
        let mut layout = Layout::default();
        for (row, line) in rows.iter().enumerate() {
            let y = (height - 1 - row) as i32;
            for (column, symbol) in line.chars().enumerate() {
                let x = column as i32;
                match symbol {
                    '.' => {}
                    '#' => layout.tiles.push(TileSeed {
                        kind: TileKind::Obstacle,
                        x,
                        y,
                        durability: 0,
                    }),
                    '*' => layout.pieces.push(PieceSeed {
                        special: SpecialKind::ColorClear,
                        ..PieceSeed::plain(PieceColor::Wild, x, y)
                    }),
                    '$' | '&' => layout.pieces.push(PieceSeed {
                        collectible: Some(CollectibleFlags {
                            cleared_at_bottom: true,
                            cleared_by_bomb: symbol == '&',
                        }),
                        ..PieceSeed::plain(PieceColor::None, x, y)
                    }),
                    other => match PieceColor::from_symbol(other) {
                        Some(color) => layout.pieces.push(PieceSeed::plain(color, x, y)),
                        None => {
                            return Err(SetupError::UnknownSymbol {
                                symbol: other,
                                row,
                                column,
                            })
                        }
                    },
                }
            }
        }
        Ok(layout)
    }

    /// Apply tiles, then pieces. Returns the number of collectibles placed.
    pub fn apply(&self, grid: &mut Grid, piece_score: u32) -> Result<usize, SetupError> {
        for seed in &self.tiles {
            grid.set_tile(Coord::new(seed.x, seed.y), seed.kind, seed.durability)?;
        }

        let mut collectibles = 0;
        for seed in &self.pieces {
            grid.spawn(Coord::new(seed.x, seed.y), seed.spec(piece_score))?;
            if seed.collectible.is_some() {
                collectibles += 1;
            }
        }
        Ok(collectibles)
    }
}

/// Build a grid sized to a text board, without refilling
pub fn grid_from_rows(rows: &[&str], piece_score: u32) -> Result<Grid, SetupError> {
    let layout = Layout::from_rows(rows)?;
    let width = rows[0].chars().count();
    let mut grid = Grid::new(width, rows.len());
    layout.apply(&mut grid, piece_score)?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_puts_first_row_on_top() {
        let grid = grid_from_rows(&["r.", "#g"], 20).unwrap();
        assert_eq!(
            grid.piece(Coord::new(0, 1)).map(|p| p.color()),
            Some(PieceColor::Red)
        );
        assert!(grid.is_obstacle(Coord::new(0, 0)));
        assert_eq!(
            grid.piece(Coord::new(1, 0)).map(|p| p.color()),
            Some(PieceColor::Green)
        );
        assert_eq!(grid.to_string(), "r.\n#g\n");
    }

    #[test]
    fn test_symbols_for_specials() {
        let grid = grid_from_rows(&["*$&"], 20).unwrap();
        let bomb = grid.piece(Coord::new(0, 0)).unwrap();
        assert_eq!(bomb.special(), SpecialKind::ColorClear);
        assert_eq!(bomb.color(), PieceColor::Wild);

        let immune = grid.piece(Coord::new(1, 0)).unwrap().collectible().unwrap();
        assert!(immune.cleared_at_bottom && !immune.cleared_by_bomb);
        let fragile = grid.piece(Coord::new(2, 0)).unwrap().collectible().unwrap();
        assert!(fragile.cleared_by_bomb);
    }

    #[test]
    fn test_bad_rows_rejected() {
        assert_eq!(Layout::from_rows(&["rg", "r"]), Err(SetupError::RaggedRows));
        assert_eq!(Layout::from_rows(&[]), Err(SetupError::RaggedRows));
        assert_eq!(
            Layout::from_rows(&["rx"]),
            Err(SetupError::UnknownSymbol {
                symbol: 'x',
                row: 0,
                column: 1
            })
        );
    }

    #[test]
    fn test_apply_counts_collectibles_and_rejects_obstacle_pieces() {
        let mut grid = Grid::new(3, 1);
        let layout = Layout {
            tiles: vec![TileSeed {
                kind: TileKind::Obstacle,
                x: 2,
                y: 0,
                durability: 0,
            }],
            pieces: vec![PieceSeed {
                collectible: Some(CollectibleFlags::default()),
                ..PieceSeed::plain(PieceColor::None, 0, 0)
            }],
        };
        assert_eq!(layout.apply(&mut grid, 20), Ok(1));

        let bad = Layout {
            tiles: Vec::new(),
            pieces: vec![PieceSeed::plain(PieceColor::Red, 2, 0)],
        };
        let err = bad.apply(&mut grid, 20).unwrap_err();
        assert_eq!(err, SetupError::Grid(GridError::Obstacle(Coord::new(2, 0))));
        assert_eq!(err.code(), "obstacle");
    }

    #[test]
    fn test_tile_seed_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        let layout = Layout {
            tiles: vec![TileSeed {
                kind: TileKind::Breakable,
                x: 5,
                y: 0,
                durability: 2,
            }],
            pieces: Vec::new(),
        };
        let err = layout.apply(&mut grid, 20).unwrap_err();
        assert_eq!(err, SetupError::Grid(GridError::OutOfBounds(Coord::new(5, 0))));
        assert_eq!(err.code(), "out_of_bounds");
    }

    #[test]
    fn test_obstacle_seed_over_piece_is_occupied() {
        let mut grid = Grid::new(2, 1);
        let pieces = Layout {
            tiles: Vec::new(),
            pieces: vec![PieceSeed::plain(PieceColor::Red, 0, 0)],
        };
        pieces.apply(&mut grid, 20).unwrap();

        let obstacle = Layout {
            tiles: vec![TileSeed {
                kind: TileKind::Obstacle,
                x: 0,
                y: 0,
                durability: 0,
            }],
            pieces: Vec::new(),
        };
        let err = obstacle.apply(&mut grid, 20).unwrap_err();
        assert_eq!(err, SetupError::Grid(GridError::Occupied(Coord::new(0, 0))));
        assert_eq!(err.code(), "occupied");
        assert!(!grid.is_obstacle(Coord::new(0, 0)));
    }

    #[test]
    fn test_level_json_round_trip() {
        let level = Level {
            config: BoardConfig {
                width: 2,
                height: 2,
                ..BoardConfig::default()
            },
            layout: Layout::from_rows(&["#*", "&r"]).unwrap(),
        };

        let json = serde_json::to_string(&level).unwrap();
        assert!(json.contains(r#""kind":"obstacle""#));
        assert!(json.contains(r#""special":"colorClear""#));
        assert!(json.contains(r#""cleared_by_bomb":true"#));
        let parsed: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, level);

        let mut grid = Grid::new(2, 2);
        assert_eq!(parsed.layout.apply(&mut grid, 20), Ok(1));
        assert!(grid.is_obstacle(Coord::new(0, 1)));
    }
}
