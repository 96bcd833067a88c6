//! Cascade engine - the async orchestrator
//!
//! [`Engine`] owns the grid and walks a swap through its phases:
//!
//! ```text
//! Idle -> Swapping -> Resolving -> Collapsing -> Refilling -> Resolving ... -> Idle
//!                                                      \-> Deadlocked -> Reshuffling -> Idle
//! ```
//!
//! Rules live in `tile-cascade-core`; this crate only sequences them and
//! suspends between phases. Moves are handed to an [`Animator`] and the
//! engine waits on their tickets, one scheduling tick at a time.
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{BoardConfig, Layout, NullSink, SwapProbe};
//! use tile_cascade_core::types::Coord;
//! use tile_cascade_engine::{Engine, InstantAnimator, Phase, SwapOutcome, Timing};
//!
//! let config = BoardConfig {
//!     width: 3,
//!     height: 2,
//!     collectible_spawn_chance: 0.0,
//!     ..BoardConfig::default()
//! };
//! let layout = Layout::from_rows(&["gbr", "rrg"]).unwrap();
//! let mut engine = Engine::new(
//!     config,
//!     Timing::instant(),
//!     &layout,
//!     InstantAnimator::default(),
//!     SwapProbe,
//!     NullSink,
//! )
//! .unwrap();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_time()
//!     .build()
//!     .unwrap();
//! let outcome = runtime
//!     .block_on(engine.swap(Coord::new(2, 0), Coord::new(2, 1)))
//!     .unwrap();
//!
//! match outcome {
//!     SwapOutcome::Resolved(report) => assert!(report.cleared >= 3),
//!     SwapOutcome::Reverted => panic!("three reds should match"),
//! }
//! assert_eq!(engine.phase(), Phase::Idle);
//! ```

pub mod animation;
pub mod config;
pub mod error;

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use tile_cascade_core::cascade::{next_clear_set, resolve_iteration, seed_swap, PendingBombs};
use tile_cascade_core::collapse::collapse_columns;
use tile_cascade_core::matcher::MatchSet;
use tile_cascade_core::refill::{refill_all, refill_columns, RefillReport};
use tile_cascade_core::scoring::multiplier_for_iteration;
use tile_cascade_core::types::Coord;
use tile_cascade_core::{
    BoardConfig, CascadeEvent, CollectibleLedger, DeadlockOracle, EventSink, Grid, Layout, Level,
    SetupError, SimpleRng, SwapProbe,
};

pub use animation::{
    move_channel, Animator, Arrival, InstantAnimator, MoveRequest, MoveTicket, TimedAnimator,
};
pub use config::Timing;
pub use error::SwapError;

/// Where the engine is in the swap/cascade cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Accepting swaps
    #[default]
    Idle,
    Swapping,
    Resolving,
    Collapsing,
    Refilling,
    /// The settled board has no legal move
    Deadlocked,
    Reshuffling,
}

/// Totals for one accepted swap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Resolving iterations run; the last multiplier used
    pub iterations: u32,
    pub cleared: usize,
    pub points: u64,
    /// Bombs placed during the cascade
    pub bombs: usize,
    /// The swap engaged a colour bomb
    pub color_bomb: bool,
    /// Refill placements that kept a match
    pub anomalies: usize,
    /// The board was cleared and refilled after a deadlock
    pub reshuffled: bool,
}

/// Result of a valid swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Nothing matched; the pieces went back and the board is as before
    Reverted,
    Resolved(CascadeReport),
}

/// Async orchestrator of one board
pub struct Engine<A, O, S> {
    grid: Grid,
    config: BoardConfig,
    timing: Timing,
    rng: SimpleRng,
    ledger: CollectibleLedger,
    phase: Phase,
    animator: A,
    oracle: O,
    sink: S,
}

impl<A, O, S> Engine<A, O, S>
where
    A: Animator,
    O: DeadlockOracle,
    S: EventSink,
{
    /// Validate the config, apply the authored layout, then fill every
    /// remaining open cell.
    pub fn new(
        config: BoardConfig,
        timing: Timing,
        layout: &Layout,
        animator: A,
        oracle: O,
        sink: S,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let mut grid = Grid::new(config.width, config.height);
        let seeded = layout.apply(&mut grid, config.piece_score)?;

        let mut engine = Self {
            grid,
            rng: SimpleRng::new(config.seed),
            ledger: CollectibleLedger::new(seeded, config.max_collectibles),
            config,
            timing,
            phase: Phase::Idle,
            animator,
            oracle,
            sink,
        };

        let refill = refill_all(
            &mut engine.grid,
            &engine.config,
            &mut engine.rng,
            &mut engine.ledger,
        );
        engine.report_anomalies(&refill);
        log::debug!(
            "board {}x{} ready: {} seeded collectibles, {} refilled",
            engine.config.width,
            engine.config.height,
            seeded,
            refill.spawned.len()
        );
        Ok(engine)
    }

    /// Build from a level file
    pub fn from_level(
        level: &Level,
        timing: Timing,
        animator: A,
        oracle: O,
        sink: S,
    ) -> Result<Self, SetupError> {
        Self::new(
            level.config.clone(),
            timing,
            &level.layout,
            animator,
            oracle,
            sink,
        )
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Swap requests are only taken while idle
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn collectibles_live(&self) -> usize {
        self.ledger.live()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    /// A productive swap on the current board, if one exists
    pub fn hint(&self) -> Option<(Coord, Coord)> {
        SwapProbe::first_legal_move(&self.grid, self.config.min_match_length)
    }

    /// Reject a swap without touching the board
    pub fn check_swap(&self, from: Coord, to: Coord) -> Result<(), SwapError> {
        if self.phase != Phase::Idle {
            return Err(SwapError::Busy(self.phase));
        }
        for c in [from, to] {
            if !self.grid.is_within_bounds(c) {
                return Err(SwapError::OutOfBounds(c));
            }
        }
        if !Grid::adjacent(from, to) {
            return Err(SwapError::NotAdjacent(from, to));
        }
        for c in [from, to] {
            if self.grid.piece(c).is_none() {
                return Err(SwapError::EmptyCell(c));
            }
        }
        Ok(())
    }

    /// Swap two adjacent pieces and resolve the cascade it sets off.
    ///
    /// The engine stays busy until the returned future completes. Dropping
    /// it part way leaves the engine in its current phase, and every later
    /// request is refused with [`SwapError::Busy`].
    pub async fn swap(&mut self, from: Coord, to: Coord) -> Result<SwapOutcome, SwapError> {
        self.check_swap(from, to)?;

        self.enter(Phase::Swapping);
        self.grid.swap(from, to);
        self.animate_swap(from, to).await;

        let Some(seed) = seed_swap(&mut self.grid, from, to, self.config.min_match_length) else {
            self.grid.swap(from, to);
            self.animate_swap(to, from).await;
            log::debug!("swap {from} <-> {to} made no match; reverted");
            self.enter(Phase::Idle);
            return Ok(SwapOutcome::Reverted);
        };

        let mut report = CascadeReport {
            color_bomb: seed.color_bomb,
            ..CascadeReport::default()
        };
        self.run_cascade(seed.clear, seed.bombs, &mut report).await;

        if !self
            .oracle
            .has_legal_move(&self.grid, self.config.min_match_length)
        {
            self.reshuffle(&mut report).await;
        }

        self.enter(Phase::Idle);
        Ok(SwapOutcome::Resolved(report))
    }

    async fn run_cascade(
        &mut self,
        mut clear: MatchSet,
        mut pending: PendingBombs,
        report: &mut CascadeReport,
    ) {
        let timing = self.timing;
        let mut iteration = 0;

        loop {
            iteration += 1;
            let multiplier = multiplier_for_iteration(iteration);

            self.enter(Phase::Resolving);
            self.sink.on_event(&CascadeEvent::IterationAdvanced {
                iteration,
                multiplier,
            });
            let step = resolve_iteration(
                &mut self.grid,
                &clear,
                multiplier,
                &mut pending,
                &mut self.ledger,
                self.config.piece_score,
                &mut self.sink,
            );
            report.iterations = iteration;
            report.cleared += step.cleared;
            report.points += step.points;
            report.bombs += step.bombs.len();
            log::debug!(
                "iteration {iteration} (x{multiplier}): cleared {} for {} points",
                step.cleared,
                step.points
            );
            pause(timing.cascade_pause).await;

            self.enter(Phase::Collapsing);
            let falls = collapse_columns(&mut self.grid, &step.columns);
            let tickets: Vec<MoveTicket> = falls
                .iter()
                .map(|fall| {
                    self.animator.request_move(MoveRequest {
                        piece: fall.piece,
                        from: fall.from,
                        to: fall.to,
                        duration: timing.fall_duration(fall.distance()),
                    })
                })
                .collect();
            await_arrivals(tickets, &timing).await;
            pause(timing.cascade_pause).await;

            self.enter(Phase::Refilling);
            let refill = refill_columns(
                &mut self.grid,
                &step.columns,
                &self.config,
                &mut self.rng,
                &mut self.ledger,
            );
            self.announce_refill(&refill);
            report.anomalies += refill.anomalies.len();
            pause(timing.cascade_pause).await;

            clear = next_clear_set(&self.grid, self.config.min_match_length);
            if clear.is_empty() {
                break;
            }
        }
    }

    /// Clear the whole board and refill it once. Score multiplier and
    /// collectible bookkeeping are left alone.
    async fn reshuffle(&mut self, report: &mut CascadeReport) {
        self.enter(Phase::Deadlocked);
        log::info!("no legal move left; reshuffling the board");
        pause(self.timing.deadlock_pause).await;

        self.enter(Phase::Reshuffling);
        let removed = self.grid.clear_pieces();
        log::debug!("reshuffle removed {} pieces", removed.len());
        pause(self.timing.deadlock_pause).await;

        let refill = refill_all(
            &mut self.grid,
            &self.config,
            &mut self.rng,
            &mut self.ledger,
        );
        self.announce_refill(&refill);
        report.anomalies += refill.anomalies.len();
        report.reshuffled = true;
        self.sink.on_event(&CascadeEvent::BoardReshuffled);
    }

    /// Both halves of a swap move at once; only the settle delay is awaited
    async fn animate_swap(&mut self, from: Coord, to: Coord) {
        for (origin, target) in [(from, to), (to, from)] {
            if let Some(piece) = self.grid.piece(target).map(|p| p.id()) {
                // Tickets are not awaited; the settle delay covers the move.
                let _ticket = self.animator.request_move(MoveRequest {
                    piece,
                    from: origin,
                    to: target,
                    duration: self.timing.swap_settle,
                });
            }
        }
        pause(self.timing.swap_settle).await;
    }

    /// Drop-in hints for refilled pieces, then anomaly events
    fn announce_refill(&mut self, refill: &RefillReport) {
        for spawn in &refill.spawned {
            let _ticket = self.animator.request_move(MoveRequest {
                piece: spawn.piece,
                from: Coord::new(spawn.coord.x, spawn.coord.y + self.timing.fill_drop_rows),
                to: spawn.coord,
                duration: self.timing.fill_move,
            });
        }
        self.report_anomalies(refill);
    }

    fn report_anomalies(&mut self, refill: &RefillReport) {
        for &coord in &refill.anomalies {
            self.sink.on_event(&CascadeEvent::RefillAnomaly { coord });
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Poll every ticket once per tick until all have arrived or the arrival
/// timeout runs out.
async fn await_arrivals(mut tickets: Vec<MoveTicket>, timing: &Timing) {
    if tickets.is_empty() {
        return;
    }

    let started = Instant::now();
    let mut tick = tokio::time::interval(timing.poll_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tick.tick().await;
        tickets.retain_mut(|ticket| !ticket.poll_arrived());
        if tickets.is_empty() {
            return;
        }
        if started.elapsed() >= timing.arrival_timeout {
            log::warn!(
                "{} moved pieces never reported arrival; continuing without them",
                tickets.len()
            );
            return;
        }
    }
}
