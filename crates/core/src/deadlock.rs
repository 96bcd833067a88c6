//! Deadlock oracle - is any swap still productive?
//!
//! The engine only asks after a cascade has settled. [`SwapProbe`] is the
//! stock oracle; it tries every adjacent swap on a scratch copy of the grid.

use crate::cascade::color_bomb_engaged;
use crate::grid::Grid;
use crate::matcher::matches_at;
use crate::types::{Coord, Direction};

/// Answers whether the settled board still has a legal move
pub trait DeadlockOracle {
    fn has_legal_move(&self, grid: &Grid, min_match_len: usize) -> bool;
}

impl<F> DeadlockOracle for F
where
    F: Fn(&Grid, usize) -> bool,
{
    fn has_legal_move(&self, grid: &Grid, min_match_len: usize) -> bool {
        self(grid, min_match_len)
    }
}

/// Brute-force swap prober
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapProbe;

impl SwapProbe {
    /// First productive swap in column-major order, as `(from, to)`
    pub fn first_legal_move(grid: &Grid, min_match_len: usize) -> Option<(Coord, Coord)> {
        let mut scratch = grid.clone();
        for a in grid.coords() {
            for dir in [Direction::Right, Direction::Up] {
                let b = a.step(dir);
                if swap_is_productive(&mut scratch, a, b, min_match_len) {
                    return Some((a, b));
                }
            }
        }
        None
    }
}

impl DeadlockOracle for SwapProbe {
    fn has_legal_move(&self, grid: &Grid, min_match_len: usize) -> bool {
        Self::first_legal_move(grid, min_match_len).is_some()
    }
}

/// Try a swap in place and undo it; true if it would resolve
fn swap_is_productive(grid: &mut Grid, a: Coord, b: Coord, min_len: usize) -> bool {
    let (Some(first), Some(second)) = (grid.piece(a), grid.piece(b)) else {
        return false;
    };
    if color_bomb_engaged(first, second) {
        return true;
    }

    grid.swap(a, b);
    let productive = !matches_at(grid, a, min_len).is_empty() || !matches_at(grid, b, min_len).is_empty();
    grid.swap(a, b);
    productive
}
