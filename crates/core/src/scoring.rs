//! Scoring module - cascade multiplier and running totals
//!
//! Every cleared piece scores `score_value * multiplier`. The multiplier is
//! 1 on the first resolving iteration of a swap and grows by one with each
//! further iteration of the same cascade.

use crate::events::{CascadeEvent, EventSink};

/// Points for one cleared piece
pub fn clear_points(score_value: u32, multiplier: u32) -> u64 {
    u64::from(score_value).saturating_mul(u64::from(multiplier))
}

/// Multiplier of the given 1-based cascade iteration
pub fn multiplier_for_iteration(iteration: u32) -> u32 {
    iteration.max(1)
}

/// Score keeping sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub total: u64,
    pub cleared: u64,
    pub collected: u64,
    /// Highest multiplier reached so far
    pub best_chain: u32,
    pub reshuffles: u32,
}

impl EventSink for ScoreTally {
    fn on_event(&mut self, event: &CascadeEvent) {
        match event {
            CascadeEvent::PieceCleared {
                points,
                collectible,
                ..
            } => {
                self.total = self.total.saturating_add(*points);
                self.cleared += 1;
                if *collectible {
                    self.collected += 1;
                }
            }
            CascadeEvent::IterationAdvanced { multiplier, .. } => {
                self.best_chain = self.best_chain.max(*multiplier);
            }
            CascadeEvent::BoardReshuffled => self.reshuffles += 1,
            CascadeEvent::TileDamaged { .. }
            | CascadeEvent::BombSpawned { .. }
            | CascadeEvent::RefillAnomaly { .. } => {}
        }
    }
}
