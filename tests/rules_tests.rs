//! Rules tests - match finding, bomb policy, refill and tile damage

use tile_cascade::core::cascade::{resolve_iteration, seed_swap, PendingBombs, SwapSeed};
use tile_cascade::core::layout::grid_from_rows;
use tile_cascade::core::matcher::{all_matches, matches_at, MatchSet};
use tile_cascade::core::refill::{refill_all, CollectibleLedger};
use tile_cascade::core::{BoardConfig, CascadeEvent, Grid, PieceSpec, SimpleRng};
use tile_cascade::types::{Coord, PieceColor, SpecialKind, TileKind};

/// Apply a swap and seed it, as the engine does
fn seeded(rows: &[&str], a: Coord, b: Coord) -> (Grid, Option<SwapSeed>) {
    let mut grid = grid_from_rows(rows, 20).unwrap();
    grid.swap(a, b);
    let seed = seed_swap(&mut grid, a, b, 3);
    (grid, seed)
}

#[test]
fn test_three_run_matches_exactly_three_without_bomb() {
    let (_, seed) = seeded(&["bgrp", "rrbo"], Coord::new(2, 0), Coord::new(2, 1));
    let seed = seed.expect("row 0 holds three reds");
    assert_eq!(seed.clear.len(), 3);
    assert!(seed.bombs.is_empty());
}

#[test]
fn test_four_run_bomb_follows_swap_axis() {
    // Vertical swap: the fourth red drops into row 0.
    let (_, seed) = seeded(&["gbrgo", "rrbro"], Coord::new(2, 0), Coord::new(2, 1));
    let seed = seed.unwrap();
    assert_eq!(seed.clear.len(), 4);
    assert_eq!(seed.bombs[0].special, SpecialKind::ColumnClear);
    assert_eq!(seed.bombs[0].coord, Coord::new(2, 0));
    assert_eq!(seed.bombs[0].color, PieceColor::Red);

    // Horizontal swap: the red at (0,2) slides right into column 1.
    let (_, seed) = seeded(&["grb", "rbg", "yrb", "grb"], Coord::new(0, 2), Coord::new(1, 2));
    let seed = seed.unwrap();
    assert_eq!(seed.clear.len(), 4);
    assert_eq!(seed.bombs[0].special, SpecialKind::RowClear);
    assert_eq!(seed.bombs[0].coord, Coord::new(1, 2));
}

#[test]
fn test_five_piece_shapes() {
    // Straight: five reds in row 0.
    let (_, seed) = seeded(&["bgrgb", "rrbrr"], Coord::new(2, 0), Coord::new(2, 1));
    let plan = seed.unwrap().bombs[0];
    assert_eq!(plan.special, SpecialKind::ColorClear);
    assert_eq!(plan.color, PieceColor::Wild);
    assert_eq!(plan.target_color, Some(PieceColor::Red));

    // Corner: three across row 1 and three up column 0, sharing (0,1).
    let (_, seed) = seeded(
        &["rbg", "rgb", "grr", "rbo"],
        Coord::new(0, 0),
        Coord::new(0, 1),
    );
    let seed = seed.unwrap();
    assert_eq!(seed.clear.len(), 5);
    assert_eq!(seed.bombs[0].special, SpecialKind::AdjacentClear);
}

#[test]
fn test_refill_leaves_no_matches() {
    let config = BoardConfig::default();
    for seed in [1, 7, 99, 12345] {
        let mut grid = Grid::new(config.width, config.height);
        let mut rng = SimpleRng::new(seed);
        let mut ledger = CollectibleLedger::new(0, config.max_collectibles);
        let report = refill_all(&mut grid, &config, &mut rng, &mut ledger);

        assert!(report.anomalies.is_empty());
        assert!(grid.open_cells().is_empty());
        assert!(all_matches(&grid, config.min_match_length).is_empty());
        assert!(ledger.live() <= config.max_collectibles);
    }
}

#[test]
fn test_refill_respects_obstacles() {
    let mut grid = grid_from_rows(&["..#.", "....", "#..."], 20).unwrap();
    let config = BoardConfig {
        width: 4,
        height: 3,
        ..BoardConfig::default()
    };
    let mut ledger = CollectibleLedger::new(0, 3);
    refill_all(&mut grid, &config, &mut SimpleRng::new(3), &mut ledger);

    assert_eq!(grid.piece_count(), 10);
    assert!(grid.piece(Coord::new(2, 2)).is_none());
    assert!(grid.piece(Coord::new(0, 0)).is_none());
}

#[test]
fn test_breakable_tile_survives_exactly_n_clears() {
    let mut grid = Grid::new(3, 1);
    grid.set_tile(Coord::new(1, 0), TileKind::Breakable, 2).unwrap();
    let row: Vec<Coord> = grid.row(0).collect();
    let seed: MatchSet = row.iter().copied().collect();
    let mut ledger = CollectibleLedger::default();

    let mut remaining = Vec::new();
    for _ in 0..3 {
        for &c in &row {
            grid.spawn(c, PieceSpec::plain(PieceColor::Red, 20)).unwrap();
        }
        let mut events: Vec<CascadeEvent> = Vec::new();
        resolve_iteration(
            &mut grid,
            &seed,
            1,
            &mut PendingBombs::new(),
            &mut ledger,
            20,
            &mut events,
        );
        remaining.push(events.iter().find_map(|e| match e {
            CascadeEvent::TileDamaged { remaining, .. } => Some(*remaining),
            _ => None,
        }));
        let kind = grid.tile(Coord::new(1, 0)).unwrap().kind();
        if remaining.len() < 2 {
            assert_eq!(kind, TileKind::Breakable);
        } else {
            assert_eq!(kind, TileKind::Normal);
        }
    }

    assert_eq!(remaining, vec![Some(1), Some(0), None]);
}

#[test]
fn test_matches_at_reports_scanned_cell_first() {
    let grid = grid_from_rows(&["r..", "r..", "rgg"], 20).unwrap();
    let set = matches_at(&grid, Coord::new(0, 1), 3);
    assert_eq!(set.first(), Some(Coord::new(0, 1)));
    assert_eq!(set.len(), 3);
}

#[test]
fn test_two_color_bombs_clear_largest_board() {
    let config = BoardConfig {
        width: 256,
        height: 256,
        collectible_spawn_chance: 0.0,
        ..BoardConfig::default()
    };
    let mut grid = Grid::new(config.width, config.height);
    let mut ledger = CollectibleLedger::new(0, config.max_collectibles);
    refill_all(&mut grid, &config, &mut SimpleRng::new(5), &mut ledger);
    let (a, b) = (Coord::new(0, 0), Coord::new(1, 0));
    for c in [a, b] {
        grid.take(c);
        grid.spawn(c, PieceSpec::bomb(SpecialKind::ColorClear, PieceColor::Wild, 20))
            .unwrap();
    }

    grid.swap(a, b);
    let seed = seed_swap(&mut grid, a, b, 3).expect("two colour bombs always engage");
    assert!(seed.color_bomb);
    assert_eq!(seed.clear.len(), 256 * 256);

    let report = resolve_iteration(
        &mut grid,
        &seed.clear,
        1,
        &mut PendingBombs::new(),
        &mut ledger,
        20,
        &mut Vec::<CascadeEvent>::new(),
    );
    assert_eq!(report.cleared, 256 * 256);
    assert_eq!(grid.piece_count(), 0);
}
