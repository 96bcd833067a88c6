//! Refill - restocks empty cells after a collapse
//!
//! Columns are filled left to right and each column bottom to top, so the
//! cells below and to the left of a new piece are already settled. Only
//! those two directions are checked for an accidental match; a placement
//! that still matches after `REFILL_RETRY_LIMIT` re-rolls is accepted and
//! reported.

use crate::config::BoardConfig;
use crate::grid::{Grid, PieceId, PieceSpec};
use crate::matcher::ray_match;
use crate::rng::SimpleRng;
use crate::types::{Coord, Direction, REFILL_RETRY_LIMIT};

/// Live collectible bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectibleLedger {
    live: usize,
    max: usize,
}

impl CollectibleLedger {
    pub fn new(live: usize, max: usize) -> Self {
        Self { live, max }
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn has_room(&self) -> bool {
        self.live < self.max
    }

    pub fn spawned(&mut self) {
        self.live += 1;
    }

    pub fn removed(&mut self) {
        self.live = self.live.saturating_sub(1);
    }
}

/// A piece placed by refill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub piece: PieceId,
    pub coord: Coord,
    pub collectible: bool,
}

/// Outcome of a refill pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefillReport {
    pub spawned: Vec<Spawn>,
    /// Cells where the retry limit ran out and a matching piece was kept
    pub anomalies: Vec<Coord>,
}

/// Refill every open cell of `columns`
pub fn refill_columns(
    grid: &mut Grid,
    columns: &[i32],
    config: &BoardConfig,
    rng: &mut SimpleRng,
    ledger: &mut CollectibleLedger,
) -> RefillReport {
    let mut columns = columns.to_vec();
    columns.sort_unstable();
    columns.dedup();

    let mut report = RefillReport::default();
    for x in columns {
        let open: Vec<Coord> = grid.column(x).filter(|&c| grid.is_open(c)).collect();
        for c in open {
            refill_cell(grid, c, config, rng, ledger, &mut report);
        }
    }
    report
}

/// Refill the whole board
pub fn refill_all(
    grid: &mut Grid,
    config: &BoardConfig,
    rng: &mut SimpleRng,
    ledger: &mut CollectibleLedger,
) -> RefillReport {
    let columns: Vec<i32> = (0..grid.width() as i32).collect();
    refill_columns(grid, &columns, config, rng, ledger)
}

fn refill_cell(
    grid: &mut Grid,
    c: Coord,
    config: &BoardConfig,
    rng: &mut SimpleRng,
    ledger: &mut CollectibleLedger,
    report: &mut RefillReport,
) {
    let top_row = c.y == grid.height() as i32 - 1;
    if top_row && !config.collectibles.is_empty() && ledger.has_room() {
        if rng.chance(config.collectible_spawn_chance) {
            let spec = *rng.pick(&config.collectibles);
            if let Ok(piece) = grid.spawn(c, spec) {
                ledger.spawned();
                report.spawned.push(Spawn {
                    piece,
                    coord: c,
                    collectible: true,
                });
                return;
            }
        }
    }

    let mut retries = 0;
    loop {
        let color = *rng.pick(&config.palette);
        let piece = match grid.spawn(c, PieceSpec::plain(color, config.piece_score)) {
            Ok(piece) => piece,
            Err(err) => {
                log::warn!("refill skipped {c}: {err}");
                return;
            }
        };
        if !creates_match(grid, c, config.min_match_length) {
            report.spawned.push(Spawn {
                piece,
                coord: c,
                collectible: false,
            });
            return;
        }
        if retries >= REFILL_RETRY_LIMIT {
            log::warn!("refill at {c} kept a matching piece after {retries} re-rolls");
            report.anomalies.push(c);
            report.spawned.push(Spawn {
                piece,
                coord: c,
                collectible: false,
            });
            return;
        }
        grid.take(c);
        retries += 1;
    }
}

/// Downward or leftward run from `c` long enough to match
fn creates_match(grid: &Grid, c: Coord, min_len: usize) -> bool {
    [Direction::Down, Direction::Left]
        .into_iter()
        .any(|dir| ray_match(grid, c, dir, min_len).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::all_matches;
    use crate::types::{PieceColor, TileKind};

    fn no_collectibles() -> BoardConfig {
        BoardConfig {
            collectibles: Vec::new(),
            ..BoardConfig::default()
        }
    }

    #[test]
    fn test_refill_fills_every_open_cell() {
        let config = no_collectibles();
        let mut grid = Grid::new(8, 8);
        grid.set_tile(Coord::new(3, 3), TileKind::Obstacle, 0).unwrap();
        let mut rng = SimpleRng::new(42);
        let mut ledger = CollectibleLedger::new(0, 0);

        let report = refill_all(&mut grid, &config, &mut rng, &mut ledger);

        assert!(grid.open_cells().is_empty());
        assert_eq!(report.spawned.len(), 63);
        assert!(grid.piece(Coord::new(3, 3)).is_none());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_refill_of_empty_board_has_no_matches() {
        let config = no_collectibles();
        for seed in 1..20 {
            let mut grid = Grid::new(8, 8);
            let mut rng = SimpleRng::new(seed);
            let mut ledger = CollectibleLedger::default();
            refill_all(&mut grid, &config, &mut rng, &mut ledger);
            assert!(all_matches(&grid, 3).is_empty(), "seed {seed}\n{grid}");
        }
    }

    #[test]
    fn test_single_color_palette_records_anomaly() {
        let config = BoardConfig {
            palette: vec![PieceColor::Red],
            ..no_collectibles()
        };
        let mut grid = Grid::new(1, 3);
        let mut rng = SimpleRng::new(5);
        let mut ledger = CollectibleLedger::default();

        let report = refill_all(&mut grid, &config, &mut rng, &mut ledger);

        assert_eq!(report.anomalies, vec![Coord::new(0, 2)]);
        assert!(grid.open_cells().is_empty());
    }

    #[test]
    fn test_collectible_spawns_only_on_top_row_within_cap() {
        let config = BoardConfig {
            collectible_spawn_chance: 1.0,
            ..BoardConfig::default()
        };
        let mut grid = Grid::new(4, 4);
        let mut rng = SimpleRng::new(9);
        let mut ledger = CollectibleLedger::new(0, 1);

        let report = refill_all(&mut grid, &config, &mut rng, &mut ledger);

        let collectibles: Vec<Coord> = report
            .spawned
            .iter()
            .filter(|s| s.collectible)
            .map(|s| s.coord)
            .collect();
        assert_eq!(collectibles, vec![Coord::new(0, 3)]);
        assert_eq!(ledger.live(), 1);
        assert!(grid.piece(Coord::new(0, 3)).unwrap().is_collectible());
    }

    #[test]
    fn test_zero_chance_never_spawns_collectible() {
        let config = BoardConfig {
            collectible_spawn_chance: 0.0,
            ..BoardConfig::default()
        };
        let mut grid = Grid::new(4, 4);
        let mut rng = SimpleRng::new(9);
        let mut ledger = CollectibleLedger::new(0, 10);
        refill_all(&mut grid, &config, &mut rng, &mut ledger);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_refill_is_deterministic_per_seed() {
        let config = BoardConfig::default();
        let run = |seed| {
            let mut grid = Grid::new(6, 6);
            let mut rng = SimpleRng::new(seed);
            let mut ledger = CollectibleLedger::new(0, 3);
            refill_all(&mut grid, &config, &mut rng, &mut ledger);
            grid
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_ledger_saturates() {
        let mut ledger = CollectibleLedger::new(0, 2);
        ledger.removed();
        assert_eq!(ledger.live(), 0);
        ledger.spawned();
        ledger.spawned();
        assert!(!ledger.has_room());
    }
}
