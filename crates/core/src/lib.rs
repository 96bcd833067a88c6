//! Core match/cascade logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the tile puzzle and none of its timing:
//! it has no async runtime, no I/O, and no rendering. The engine crate
//! drives these steps and waits on animation between them.
//!
//! - **Deterministic**: the same board seed replays the same refills
//! - **Arena-based**: pieces only exist inside a [`Grid`] and always know
//!   their own cell
//!
//! # Module Structure
//!
//! - [`grid`]: tile and piece arenas, bounds and adjacency
//! - [`matcher`]: ray scans, axis matches and full-board scans
//! - [`special`]: which bomb a swap match creates
//! - [`blast`]: row, column and 3x3 bomb areas
//! - [`collapse`]: gravity compaction
//! - [`refill`]: restocking with the no-immediate-match check
//! - [`cascade`]: swap seeding and one resolving iteration
//! - [`deadlock`]: the legal-move oracle
//! - [`scoring`]: multiplier arithmetic and the score tally
//! - [`layout`]: authored boards and level files
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::cascade::{next_clear_set, resolve_iteration, seed_swap, PendingBombs};
//! use tile_cascade_core::layout::grid_from_rows;
//! use tile_cascade_core::refill::CollectibleLedger;
//! use tile_cascade_core::types::Coord;
//! use tile_cascade_core::ScoreTally;
//!
//! let mut grid = grid_from_rows(&["gbr", "rrg"], 20).unwrap();
//! let (a, b) = (Coord::new(2, 0), Coord::new(2, 1));
//! grid.swap(a, b);
//!
//! let seed = seed_swap(&mut grid, a, b, 3).expect("three reds in row 0");
//! let mut bombs: PendingBombs = seed.bombs;
//! let mut tally = ScoreTally::default();
//! let report = resolve_iteration(
//!     &mut grid,
//!     &seed.clear,
//!     1,
//!     &mut bombs,
//!     &mut CollectibleLedger::default(),
//!     20,
//!     &mut tally,
//! );
//!
//! assert_eq!(report.cleared, 3);
//! assert_eq!(tally.total, 60);
//! assert!(next_clear_set(&grid, 3).is_empty());
//! ```

pub mod blast;
pub mod cascade;
pub mod collapse;
pub mod config;
pub mod deadlock;
pub mod events;
pub mod grid;
pub mod layout;
pub mod matcher;
pub mod refill;
pub mod rng;
pub mod scoring;
pub mod special;

pub use tile_cascade_types as types;

// Re-export commonly used types for convenience
pub use config::{BoardConfig, ConfigError};
pub use deadlock::{DeadlockOracle, SwapProbe};
pub use events::{CascadeEvent, EventSink, NullSink};
pub use grid::{Grid, GridError, Piece, PieceId, PieceSpec, Tile};
pub use layout::{Layout, Level, SetupError};
pub use matcher::MatchSet;
pub use refill::CollectibleLedger;
pub use rng::SimpleRng;
pub use scoring::ScoreTally;
