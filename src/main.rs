//! Headless cascade runner (default binary).
//!
//! Plays hinted swaps on a board and prints the board and score after each
//! cascade. The board comes from a level JSON file given as the first
//! argument, or from `CASCADE_*` environment variables when none is given.
//!
//! ```text
//! RUST_LOG=debug CASCADE_AUTOPLAY_MOVES=20 tile-cascade level.json
//! ```

use std::env;
use std::fs;

use anyhow::{Context, Result};

use tile_cascade::core::{BoardConfig, Layout, Level, ScoreTally, SwapProbe};
use tile_cascade::engine::{Engine, InstantAnimator, SwapOutcome, Timing};

const DEFAULT_AUTOPLAY_MOVES: u32 = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let level = match env::args().nth(1) {
        Some(path) => {
            let text =
                fs::read_to_string(&path).with_context(|| format!("reading level {path}"))?;
            serde_json::from_str::<Level>(&text).with_context(|| format!("parsing level {path}"))?
        }
        None => Level {
            config: BoardConfig::from_env(),
            layout: Layout::default(),
        },
    };
    let moves = env::var("CASCADE_AUTOPLAY_MOVES")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_AUTOPLAY_MOVES);

    let mut engine = Engine::from_level(
        &level,
        Timing::instant(),
        InstantAnimator::default(),
        SwapProbe,
        ScoreTally::default(),
    )?;
    log::info!(
        "playing {} hinted moves on a {}x{} board",
        moves,
        level.config.width,
        level.config.height
    );
    println!("{}", engine.grid());

    for turn in 1..=moves {
        let Some((from, to)) = engine.hint() else {
            log::info!("stopping after {} moves", turn - 1);
            println!("no legal move left");
            break;
        };
        // The instant animator records every move; keep only this turn's.
        engine.animator_mut().requests.clear();

        match engine.swap(from, to).await? {
            SwapOutcome::Reverted => println!("move {turn}: {from} <-> {to} reverted"),
            SwapOutcome::Resolved(report) => {
                println!(
                    "move {turn}: {from} <-> {to} cleared {} in {} iterations for {} points{}",
                    report.cleared,
                    report.iterations,
                    report.points,
                    if report.reshuffled { " (reshuffled)" } else { "" }
                );
            }
        }
        println!("{}", engine.grid());
    }

    let tally = engine.sink();
    println!(
        "score {} | cleared {} | collected {} | best chain x{} | reshuffles {}",
        tally.total, tally.cleared, tally.collected, tally.best_chain, tally.reshuffles
    );
    Ok(())
}
