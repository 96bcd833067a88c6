//! Special-piece policy - which bomb a swap match produces
//!
//! | match size | shape    | bomb                                   |
//! |------------|----------|----------------------------------------|
//! | >= 5       | corner   | AdjacentClear                          |
//! | >= 5       | straight | ColorClear (Wild)                      |
//! | 4          | any      | RowClear (horizontal swap) / ColumnClear |
//! | 3          | any      | none                                   |
//!
//! Bombs are only planned for the two cells of a player swap, never for
//! cascade matches.

use crate::grid::{Grid, PieceSpec};
use crate::matcher::MatchSet;
use crate::types::{Axis, Coord, PieceColor, SpecialKind};

/// A bomb waiting to be placed once its host match has been cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BombPlan {
    pub coord: Coord,
    pub special: SpecialKind,
    pub color: PieceColor,
    /// Set for colour bombs: the colour of the match that created them
    pub target_color: Option<PieceColor>,
}

impl BombPlan {
    /// Piece blueprint for placement
    pub fn spec(&self, score: u32) -> PieceSpec {
        PieceSpec {
            target_color: self.target_color,
            ..PieceSpec::bomb(self.special, self.color, score)
        }
    }
}

/// L/T test relative to the first cell of the set
pub fn corner_shape(set: &MatchSet) -> bool {
    let Some(origin) = set.first() else {
        return false;
    };
    let same_row = set.iter().any(|c| c.y == origin.y && c.x != origin.x);
    let same_column = set.iter().any(|c| c.x == origin.x && c.y != origin.y);
    same_row && same_column
}

/// First concrete colour among the matched pieces
pub fn match_color(grid: &Grid, set: &MatchSet) -> Option<PieceColor> {
    set.iter()
        .filter_map(|c| grid.piece(c))
        .map(|p| p.color())
        .find(|&color| color.is_matchable() && color != PieceColor::Wild)
}

/// Decide the bomb for one swapped cell.
///
/// `matched` is the match set found at `cell`. A colour bomb sitting on the
/// cell never seeds another bomb; its own propagation covers that side.
pub fn plan_bomb(grid: &Grid, cell: Coord, swap_axis: Axis, matched: &MatchSet) -> Option<BombPlan> {
    if matched.len() < 4 {
        return None;
    }
    if grid
        .piece(cell)
        .is_some_and(|p| p.special() == SpecialKind::ColorClear)
    {
        return None;
    }

    let color = match_color(grid, matched);
    let plan = |special, color| BombPlan {
        coord: cell,
        special,
        color,
        target_color: None,
    };

    if matched.len() >= 5 {
        if corner_shape(matched) {
            return color.map(|color| plan(SpecialKind::AdjacentClear, color));
        }
        return Some(BombPlan {
            target_color: color,
            ..plan(SpecialKind::ColorClear, PieceColor::Wild)
        });
    }

    let special = match swap_axis {
        Axis::Horizontal => SpecialKind::RowClear,
        Axis::Vertical => SpecialKind::ColumnClear,
    };
    color.map(|color| plan(special, color))
}
