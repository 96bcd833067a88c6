//! Cascade events and observer sinks
//!
//! Sinks are purely observational: the cascade never reads anything back.

use crate::grid::PieceId;
use crate::types::{Coord, PieceColor, SpecialKind};

/// Something that happened while resolving a swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeEvent {
    /// A resolving iteration started; the first iteration of a swap is 1
    IterationAdvanced { iteration: u32, multiplier: u32 },
    PieceCleared {
        piece: PieceId,
        coord: Coord,
        color: PieceColor,
        special: SpecialKind,
        collectible: bool,
        points: u64,
    },
    /// A Breakable tile took a hit; `remaining == 0` means it is Normal now
    TileDamaged { coord: Coord, remaining: u32 },
    BombSpawned {
        piece: PieceId,
        coord: Coord,
        special: SpecialKind,
    },
    /// Refill kept a matching piece after running out of re-rolls
    RefillAnomaly { coord: Coord },
    /// No legal move was left; the board was cleared and refilled
    BoardReshuffled,
}

/// Observer of cascade events
pub trait EventSink {
    fn on_event(&mut self, event: &CascadeEvent);
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &CascadeEvent) {}
}

/// Recording sink
impl EventSink for Vec<CascadeEvent> {
    fn on_event(&mut self, event: &CascadeEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: &CascadeEvent) {
        (**self).on_event(event);
    }
}
