//! Swap request errors

use thiserror::Error;

use tile_cascade_core::types::Coord;

use crate::Phase;

/// Why a swap request was turned down. The board is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("input is disabled while the engine is {0:?}")]
    Busy(Phase),
    #[error("cell {0} is outside the board")]
    OutOfBounds(Coord),
    #[error("cells {0} and {1} are not adjacent")]
    NotAdjacent(Coord, Coord),
    #[error("cell {0} holds no piece")]
    EmptyCell(Coord),
}

impl SwapError {
    /// Get the error code for protocol/UI reporting
    pub fn code(&self) -> &'static str {
        match self {
            SwapError::Busy(_) => "busy",
            SwapError::OutOfBounds(_) | SwapError::NotAdjacent(..) | SwapError::EmptyCell(_) => {
                "illegal_move"
            }
        }
    }

    /// Get a human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            SwapError::Busy(_) => "cascade in progress",
            SwapError::OutOfBounds(_) => "not a legal move: outside the board",
            SwapError::NotAdjacent(..) => "not a legal move: cells are not adjacent",
            SwapError::EmptyCell(_) => "not a legal move: empty cell",
        }
    }
}
