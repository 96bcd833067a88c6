//! Collapse - gravity compaction of columns
//!
//! Each gap is filled by the nearest piece above it. Pieces pass over
//! Obstacle cells on the way down; the obstacles themselves never move and
//! are never filled.

use crate::grid::{Grid, PieceId};
use crate::types::Coord;

/// A piece moved down by a collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub piece: PieceId,
    pub from: Coord,
    pub to: Coord,
}

impl Fall {
    /// Cells travelled; scales the animation duration
    pub fn distance(&self) -> u32 {
        self.from.y.abs_diff(self.to.y)
    }
}

/// Collapse one column, bottom to top
pub fn collapse_column(grid: &mut Grid, x: i32) -> Vec<Fall> {
    let mut falls = Vec::new();
    let height = grid.height() as i32;
    for y in 0..height - 1 {
        let gap = Coord::new(x, y);
        if !grid.is_open(gap) {
            continue;
        }
        let source = (y + 1..height)
            .map(|above| Coord::new(x, above))
            .find(|&c| grid.piece(c).is_some());
        if let Some(from) = source {
            let piece = grid.move_piece(from, gap);
            falls.push(Fall {
                piece,
                from,
                to: gap,
            });
        }
    }
    falls
}

/// Collapse several columns
pub fn collapse_columns(grid: &mut Grid, columns: &[i32]) -> Vec<Fall> {
    columns
        .iter()
        .flat_map(|&x| collapse_column(grid, x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::grid_from_rows;
    use crate::types::PieceColor;

    fn column_colors(grid: &Grid, x: i32) -> String {
        grid.column(x)
            .map(|c| grid.piece(c).map_or('.', |p| p.color().symbol()))
            .collect()
    }

    #[test]
    fn test_collapse_closes_gaps() {
        // Column bottom to top: r . g . b
        let mut grid = grid_from_rows(&["b", ".", "g", ".", "r"], 20).unwrap();
        let falls = collapse_column(&mut grid, 0);

        assert_eq!(column_colors(&grid, 0), "rgb..");
        assert_eq!(falls.len(), 2);
        assert_eq!(falls[0].from, Coord::new(0, 2));
        assert_eq!(falls[0].to, Coord::new(0, 1));
        assert_eq!(falls[1].distance(), 2);
    }

    #[test]
    fn test_collapse_passes_over_obstacles() {
        let mut grid = grid_from_rows(&["y", "#", ".", "r"], 20).unwrap();
        let falls = collapse_column(&mut grid, 0);

        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].to, Coord::new(0, 1));
        assert_eq!(falls[0].distance(), 2);
        assert!(grid.is_obstacle(Coord::new(0, 2)));
        assert_eq!(
            grid.piece(Coord::new(0, 1)).map(|p| p.color()),
            Some(PieceColor::Yellow)
        );
    }

    #[test]
    fn test_full_column_does_not_move() {
        let mut grid = grid_from_rows(&["r", "g", "b"], 20).unwrap();
        let before = grid.clone();
        assert!(collapse_column(&mut grid, 0).is_empty());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_falls_keep_piece_identity() {
        let mut grid = grid_from_rows(&["g", "."], 20).unwrap();
        let id = grid.piece(Coord::new(0, 1)).unwrap().id();
        let falls = collapse_columns(&mut grid, &[0]);
        assert_eq!(falls[0].piece, id);
        assert_eq!(grid.piece(Coord::new(0, 0)).unwrap().id(), id);
    }
}
