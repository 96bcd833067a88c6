//! Cascade steps - swap seeding and one resolving iteration
//!
//! These are the synchronous pieces of the cascade. The async engine
//! sequences them with collapse, refill and animation waits:
//!
//! 1. [`seed_swap`] turns a performed swap into the first clear set and the
//!    bombs it plans (or `None`, meaning the swap must be reverted).
//! 2. [`resolve_iteration`] expands the clear set through bombs, clears it,
//!    damages tiles, and places the pending bombs.
//! 3. [`next_clear_set`] re-scans the settled board for the next iteration.

use arrayvec::ArrayVec;

use crate::blast::{blast_can_clear, bombed_pieces};
use crate::events::{CascadeEvent, EventSink};
use crate::grid::{Grid, Piece, PieceId};
use crate::matcher::{all_matches, matches_at, pieces_of_color, MatchSet};
use crate::refill::CollectibleLedger;
use crate::scoring::clear_points;
use crate::special::{plan_bomb, BombPlan};
use crate::types::{Axis, Coord, SpecialKind, BLAST_PASSES};

/// Bombs waiting for their host clear; at most one per swapped cell
pub type PendingBombs = ArrayVec<BombPlan, 2>;

/// First clear set of an accepted swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSeed {
    pub clear: MatchSet,
    pub bombs: PendingBombs,
    /// A colour bomb took part in the swap
    pub color_bomb: bool,
}

/// Result of one resolving iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationReport {
    /// Columns that lost pieces, ascending
    pub columns: Vec<i32>,
    pub cleared: usize,
    pub points: u64,
    pub bombs: Vec<PieceId>,
}

/// True if swapping these two pieces triggers a colour bomb
pub fn color_bomb_engaged(first: &Piece, second: &Piece) -> bool {
    first.special() == SpecialKind::ColorClear || second.special() == SpecialKind::ColorClear
}

/// Colour bomb propagation for a performed swap.
///
/// One colour bomb adopts its partner's colour, whatever it is, and takes
/// every piece of that colour. Swapped with a collectible it adopts `None`
/// and takes the collectibles. Two colour bombs take the whole board.
pub fn color_propagation(grid: &mut Grid, a: Coord, b: Coord) -> Option<MatchSet> {
    let (first, second) = (grid.piece(a)?, grid.piece(b)?);
    if !color_bomb_engaged(first, second) {
        return None;
    }

    let first_bomb = first.special() == SpecialKind::ColorClear;
    let second_bomb = second.special() == SpecialKind::ColorClear;
    if first_bomb && second_bomb {
        return Some(grid.coords().filter(|&c| grid.piece(c).is_some()).collect());
    }

    let (bomb, partner_color) = if first_bomb {
        (a, second.color())
    } else {
        (b, first.color())
    };
    grid.adopt_color(bomb, partner_color);
    Some(pieces_of_color(grid, partner_color))
}

/// Evaluate a swap that has already been applied to `grid`.
///
/// `a` is the cell the player moved from, `b` the cell moved to. Returns
/// `None` when neither cell matches and no colour bomb is engaged; the
/// caller must then swap back.
pub fn seed_swap(grid: &mut Grid, a: Coord, b: Coord, min_len: usize) -> Option<SwapSeed> {
    let axis = Axis::between(a, b);
    let at_a = matches_at(grid, a, min_len);
    let at_b = matches_at(grid, b, min_len);

    let mut bombs = PendingBombs::new();
    for (cell, found) in [(a, &at_a), (b, &at_b)] {
        if let Some(plan) = plan_bomb(grid, cell, axis, found) {
            bombs.push(plan);
        }
    }

    let propagation = color_propagation(grid, a, b);
    if at_a.is_empty() && at_b.is_empty() && propagation.is_none() {
        return None;
    }

    let mut clear = at_a;
    clear.union(&at_b);
    let color_bomb = propagation.is_some();
    if let Some(colored) = propagation {
        clear.union(&colored);
    }

    Some(SwapSeed {
        clear,
        bombs,
        color_bomb,
    })
}

/// Collectibles resting on the bottom row that leave the board there
pub fn collectibles_at_bottom(grid: &Grid) -> MatchSet {
    grid.row(0)
        .filter(|&c| {
            grid.piece(c)
                .and_then(|p| p.collectible())
                .is_some_and(|flags| flags.cleared_at_bottom)
        })
        .collect()
}

/// Every piece of the target colour of each primed colour bomb in `set`
fn color_detonations(grid: &Grid, set: &MatchSet) -> MatchSet {
    let mut detonated = MatchSet::new();
    for c in set.iter() {
        let Some(piece) = grid.piece(c) else {
            continue;
        };
        if piece.special() != SpecialKind::ColorClear {
            continue;
        }
        if let Some(target) = piece.target_color() {
            detonated.union(&pieces_of_color(grid, target));
        }
    }
    detonated.retain(|&c| blast_can_clear(grid, c));
    detonated
}

/// Grow a clear set through the bombs it contains, `BLAST_PASSES` times
pub fn expand_clear_set(grid: &Grid, seed: &MatchSet) -> MatchSet {
    let mut set = seed.clone();
    for _ in 0..BLAST_PASSES {
        let mut extra = bombed_pieces(grid, &set);
        extra.union(&color_detonations(grid, &set));
        set.union(&extra);
    }
    set
}

/// One resolving iteration: expand, clear, score, damage tiles, then place
/// the pending bombs.
pub fn resolve_iteration<S: EventSink + ?Sized>(
    grid: &mut Grid,
    seed: &MatchSet,
    multiplier: u32,
    pending: &mut PendingBombs,
    ledger: &mut CollectibleLedger,
    bomb_score: u32,
    sink: &mut S,
) -> IterationReport {
    let mut seed = seed.clone();
    seed.union(&collectibles_at_bottom(grid));
    let clear = expand_clear_set(grid, &seed);

    let mut report = IterationReport {
        columns: clear.columns(),
        ..IterationReport::default()
    };

    for c in clear.iter() {
        let Some(piece) = grid.take(c) else {
            continue;
        };
        let points = clear_points(piece.score(), multiplier);
        if piece.is_collectible() {
            ledger.removed();
        }
        report.cleared += 1;
        report.points += points;
        sink.on_event(&CascadeEvent::PieceCleared {
            piece: piece.id(),
            coord: c,
            color: piece.color(),
            special: piece.special(),
            collectible: piece.is_collectible(),
            points,
        });
        if let Some(remaining) = grid.damage_tile(c) {
            sink.on_event(&CascadeEvent::TileDamaged {
                coord: c,
                remaining,
            });
        }
    }

    for plan in pending.drain(..) {
        match grid.spawn(plan.coord, plan.spec(bomb_score)) {
            Ok(piece) => {
                report.bombs.push(piece);
                sink.on_event(&CascadeEvent::BombSpawned {
                    piece,
                    coord: plan.coord,
                    special: plan.special,
                });
            }
            Err(err) => log::warn!("dropping {:?} bomb: {err}", plan.special),
        }
    }

    report
}

/// Clear set for the next iteration: board matches plus bottom collectibles
pub fn next_clear_set(grid: &Grid, min_len: usize) -> MatchSet {
    let mut set = all_matches(grid, min_len);
    set.union(&collectibles_at_bottom(grid));
    set
}
