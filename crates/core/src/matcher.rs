//! Match finder - directional ray scans and match aggregation
//!
//! Matches are found by scanning outward from a cell: two opposite rays per
//! axis are merged, so a cell in the middle of a run (a 2+2 "arm") qualifies
//! even though neither ray alone is long enough.
//!
//! Colour rules: `None` never matches. `Wild` matches anything; a run that
//! starts on a Wild piece takes the colour of its first non-Wild member.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::grid::Grid;
use crate::types::{Axis, Coord, Direction, PieceColor, RAY_MIN_RUN};

/// Insertion-ordered set of cells
///
/// The first cell of a match is always the cell it was scanned from, which
/// the corner-shape test relies on. Membership checks go through a hash set.
#[derive(Clone, Default)]
pub struct MatchSet {
    cells: Vec<Coord>,
    members: FxHashSet<Coord>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.members.contains(&c)
    }

    /// Insert a cell; returns false if it was already present
    pub fn insert(&mut self, c: Coord) -> bool {
        if !self.members.insert(c) {
            return false;
        }
        self.cells.push(c);
        true
    }

    /// Union in place, keeping this set's order first
    pub fn union(&mut self, other: &MatchSet) {
        self.cells.reserve(other.len());
        for &c in &other.cells {
            self.insert(c);
        }
    }

    pub fn first(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Coord) -> bool) {
        let members = &mut self.members;
        self.cells.retain(|c| {
            let kept = keep(c);
            if !kept {
                members.remove(c);
            }
            kept
        });
    }

    /// Distinct columns, ascending
    pub fn columns(&self) -> Vec<i32> {
        let mut columns: Vec<i32> = self.cells.iter().map(|c| c.x).collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.cells
    }
}

// Order matters: two sets with the same cells in a different order differ.
impl PartialEq for MatchSet {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for MatchSet {}

impl fmt::Debug for MatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.cells).finish()
    }
}

impl FromIterator<Coord> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Coord> for MatchSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for c in iter {
            self.insert(c);
        }
    }
}

/// A single-colour run produced by a ray scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Start cell first, then in scan order
    pub cells: Vec<Coord>,
    /// Resolved colour; `Wild` only if every member is Wild
    pub color: PieceColor,
}

/// Scan from `start` towards `dir`.
///
/// Returns `None` when the run is shorter than `min_run`, including when
/// `start` is empty or holds a `None`-coloured piece.
pub fn ray_match(grid: &Grid, start: Coord, dir: Direction, min_run: usize) -> Option<Run> {
    let first = grid.piece(start)?;
    if !first.color().is_matchable() {
        return None;
    }

    let mut run = Run {
        cells: vec![start],
        color: first.color(),
    };
    let mut next = start;
    for _ in 0..grid.max_ray_steps() {
        next = next.step(dir);
        let Some(piece) = grid.piece(next) else {
            break;
        };
        if !piece.color().matches(run.color) {
            break;
        }
        if run.color == PieceColor::Wild {
            run.color = piece.color();
        }
        run.cells.push(next);
    }

    (run.cells.len() >= min_run).then_some(run)
}

/// Merge the two opposite rays through `cell` along `axis`.
///
/// Each ray needs the start piece plus one neighbour; the union (sharing the
/// start cell) must reach `min_len`. When the start is Wild and the two rays
/// resolved to different colours they are not merged: the longer ray stands
/// on its own if it is long enough.
pub fn axis_match(grid: &Grid, cell: Coord, axis: Axis, min_len: usize) -> Option<MatchSet> {
    let [neg, pos] = axis.directions();
    let runs = (
        ray_match(grid, cell, neg, RAY_MIN_RUN),
        ray_match(grid, cell, pos, RAY_MIN_RUN),
    );

    let merged: MatchSet = match runs {
        (Some(a), Some(b)) if a.color.matches(b.color) => {
            a.cells.iter().chain(b.cells.iter()).copied().collect()
        }
        (Some(a), Some(b)) => {
            let longer = if b.cells.len() > a.cells.len() { b } else { a };
            longer.cells.into_iter().collect()
        }
        (Some(run), None) | (None, Some(run)) => run.cells.into_iter().collect(),
        (None, None) => return None,
    };

    (merged.len() >= min_len).then_some(merged)
}

/// Union of the horizontal and vertical matches through `cell`
///
/// Empty when nothing matches. When non-empty, `cell` is the first member.
pub fn matches_at(grid: &Grid, cell: Coord, min_len: usize) -> MatchSet {
    let mut set = MatchSet::new();
    for axis in [Axis::Horizontal, Axis::Vertical] {
        if let Some(found) = axis_match(grid, cell, axis, min_len) {
            set.union(&found);
        }
    }
    set
}

/// Union of `matches_at` over a list of cells
pub fn matches_touching(grid: &Grid, cells: &[Coord], min_len: usize) -> MatchSet {
    let mut set = MatchSet::new();
    for &c in cells {
        set.union(&matches_at(grid, c, min_len));
    }
    set
}

/// Full-board scan
pub fn all_matches(grid: &Grid, min_len: usize) -> MatchSet {
    let mut set = MatchSet::new();
    for c in grid.coords() {
        set.union(&matches_at(grid, c, min_len));
    }
    set
}

/// Every piece of exactly `color`, column-major
pub fn pieces_of_color(grid: &Grid, color: PieceColor) -> MatchSet {
    grid.find(|p| p.color() == color).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::grid_from_rows;

    #[test]
    fn test_ray_stops_at_other_color() {
        let grid = grid_from_rows(&["rrrg"], 20).unwrap();
        let run = ray_match(&grid, Coord::new(0, 0), Direction::Right, 3).unwrap();
        assert_eq!(run.cells.len(), 3);
        assert_eq!(run.color, PieceColor::Red);
        assert!(ray_match(&grid, Coord::new(1, 0), Direction::Right, 3).is_none());
    }

    #[test]
    fn test_ray_no_match_distinct_from_empty() {
        let grid = grid_from_rows(&["r.r"], 20).unwrap();
        assert!(ray_match(&grid, Coord::new(1, 0), Direction::Right, 1).is_none());
        let single = ray_match(&grid, Coord::new(0, 0), Direction::Right, 1).unwrap();
        assert_eq!(single.cells, vec![Coord::new(0, 0)]);
    }

    #[test]
    fn test_collectible_never_matches() {
        let grid = grid_from_rows(&["$$$"], 20).unwrap();
        assert!(ray_match(&grid, Coord::new(0, 0), Direction::Right, 1).is_none());
        assert!(all_matches(&grid, 3).is_empty());
    }

    #[test]
    fn test_two_plus_two_arm_qualifies() {
        let grid = grid_from_rows(&["grrrg"], 20).unwrap();
        let found = matches_at(&grid, Coord::new(2, 0), 3);
        assert_eq!(found.len(), 3);
        assert_eq!(found.first(), Some(Coord::new(2, 0)));
    }

    #[test]
    fn test_wild_start_bridges_same_color() {
        let grid = grid_from_rows(&["r*r"], 20).unwrap();
        assert_eq!(matches_at(&grid, Coord::new(1, 0), 3).len(), 3);
    }

    #[test]
    fn test_wild_start_does_not_bridge_two_colors() {
        let grid = grid_from_rows(&["r*g"], 20).unwrap();
        assert!(matches_at(&grid, Coord::new(1, 0), 3).is_empty());

        let grid = grid_from_rows(&["r*gg"], 20).unwrap();
        let found = matches_at(&grid, Coord::new(1, 0), 3);
        assert_eq!(
            found.as_slice(),
            &[Coord::new(1, 0), Coord::new(2, 0), Coord::new(3, 0)]
        );
    }

    #[test]
    fn test_wild_inside_run_extends_it() {
        let grid = grid_from_rows(&["rr*rb"], 20).unwrap();
        let run = ray_match(&grid, Coord::new(0, 0), Direction::Right, 3).unwrap();
        assert_eq!(run.cells.len(), 4);
    }

    #[test]
    fn test_matches_at_unions_both_axes() {
        let grid = grid_from_rows(&["r..", "r..", "rrr"], 20).unwrap();
        let found = matches_at(&grid, Coord::new(0, 0), 3);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_all_matches_finds_every_run() {
        let grid = grid_from_rows(&["bbbg", "gryr", "rrrg"], 20).unwrap();
        let found = all_matches(&grid, 3);
        assert_eq!(found.len(), 6);
        assert!(!found.contains(Coord::new(3, 0)));
    }

    #[test]
    fn test_min_len_raises_threshold() {
        let grid = grid_from_rows(&["rrrg"], 20).unwrap();
        assert!(all_matches(&grid, 4).is_empty());
        assert_eq!(all_matches(&grid, 3).len(), 3);
    }

    #[test]
    fn test_match_set_keeps_order_and_membership() {
        let mut set: MatchSet = [Coord::new(2, 0), Coord::new(0, 0), Coord::new(2, 0)]
            .into_iter()
            .collect();
        assert_eq!(set.as_slice(), &[Coord::new(2, 0), Coord::new(0, 0)]);

        set.retain(|c| c.x == 0);
        assert!(!set.contains(Coord::new(2, 0)));
        assert!(set.insert(Coord::new(2, 0)));
        assert_eq!(set.as_slice(), &[Coord::new(0, 0), Coord::new(2, 0)]);

        let reordered: MatchSet = [Coord::new(2, 0), Coord::new(0, 0)].into_iter().collect();
        assert_ne!(set, reordered);
    }
}
