//! Bomb effect resolver - positional blast areas
//!
//! Row, column and 3x3 bombs are resolved here. Colour bombs need a lookup
//! by colour instead of position and are handled by [`crate::cascade`].

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::matcher::MatchSet;
use crate::types::{Coord, SpecialKind};

/// Cells holding a piece inside the blast of a bomb at `origin`
pub fn blast_area(grid: &Grid, origin: Coord, special: SpecialKind) -> Vec<Coord> {
    let cells: Vec<Coord> = match special {
        SpecialKind::RowClear => grid.row(origin.y).collect(),
        SpecialKind::ColumnClear => grid.column(origin.x).collect(),
        SpecialKind::AdjacentClear => block_3x3(origin).into_iter().collect(),
        SpecialKind::ColorClear | SpecialKind::None => Vec::new(),
    };
    cells
        .into_iter()
        .filter(|&c| grid.piece(c).is_some())
        .collect()
}

fn block_3x3(origin: Coord) -> ArrayVec<Coord, 9> {
    let mut block = ArrayVec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            block.push(Coord::new(origin.x + dx, origin.y + dy));
        }
    }
    block
}

/// True if a blast is allowed to take the piece at `c`
pub fn blast_can_clear(grid: &Grid, c: Coord) -> bool {
    match grid.piece(c).and_then(|p| p.collectible()) {
        Some(flags) => flags.cleared_by_bomb,
        None => true,
    }
}

/// One positional pass over `set`.
///
/// Returns the pieces blasted by every row, column and 3x3 bomb in `set`,
/// minus collectibles that are immune to bombs.
pub fn bombed_pieces(grid: &Grid, set: &MatchSet) -> MatchSet {
    let mut bombed = MatchSet::new();
    for c in set.iter() {
        let Some(piece) = grid.piece(c) else {
            continue;
        };
        bombed.extend(blast_area(grid, c, piece.special()));
    }
    bombed.retain(|&c| blast_can_clear(grid, c));
    bombed
}
