//! Animation seam - move requests and arrival tickets
//!
//! The engine never interpolates positions. It hands each move to an
//! [`Animator`] and gets back a [`MoveTicket`], a oneshot receiver that the
//! animator resolves once the piece has reached its cell.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};

use tile_cascade_core::grid::PieceId;
use tile_cascade_core::types::Coord;

/// One piece moving between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub piece: PieceId,
    /// May lie above the board for refill drop-ins
    pub from: Coord,
    pub to: Coord,
    /// Presentation hint
    pub duration: Duration,
}

/// Sending half of a move; resolves its ticket
#[derive(Debug)]
pub struct Arrival {
    tx: oneshot::Sender<()>,
}

impl Arrival {
    pub fn arrive(self) {
        // The engine may have stopped waiting; that is fine.
        let _ = self.tx.send(());
    }
}

/// Receiving half of a move
#[derive(Debug)]
pub struct MoveTicket {
    rx: oneshot::Receiver<()>,
}

/// A linked arrival/ticket pair
pub fn move_channel() -> (Arrival, MoveTicket) {
    let (tx, rx) = oneshot::channel();
    (Arrival { tx }, MoveTicket { rx })
}

impl MoveTicket {
    /// Ticket that has already arrived
    pub fn arrived() -> Self {
        let (arrival, ticket) = move_channel();
        arrival.arrive();
        ticket
    }

    /// Non-blocking check, used once per scheduling tick.
    ///
    /// A ticket whose animator dropped the [`Arrival`] counts as arrived.
    pub fn poll_arrived(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                log::warn!("move ticket abandoned by animator; treating piece as arrived");
                true
            }
        }
    }
}

impl Future for MoveTicket {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.rx).poll(cx).map(|_| ())
    }
}

/// Presentation collaborator that carries out moves
pub trait Animator {
    fn request_move(&mut self, request: MoveRequest) -> MoveTicket;
}

/// Completes every move immediately; for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct InstantAnimator {
    /// Every request received, in order
    pub requests: Vec<MoveRequest>,
}

impl Animator for InstantAnimator {
    fn request_move(&mut self, request: MoveRequest) -> MoveTicket {
        self.requests.push(request);
        MoveTicket::arrived()
    }
}

/// Completes each move after its requested duration on the tokio timer.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct TimedAnimator {
    /// Scales every duration; 1.0 plays them as requested
    pub speed: f32,
}

impl TimedAnimator {
    pub fn new() -> Self {
        Self { speed: 1.0 }
    }

    /// Requested duration at this speed. A non-positive speed plays moves
    /// instantly; a scaled duration too long to represent saturates.
    fn scaled(&self, duration: Duration) -> Duration {
        if self.speed.is_nan() || self.speed <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(duration.as_secs_f64() / f64::from(self.speed))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for TimedAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator for TimedAnimator {
    fn request_move(&mut self, request: MoveRequest) -> MoveTicket {
        let (arrival, ticket) = move_channel();
        let duration = self.scaled(request.duration);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            arrival.arrive();
        });
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    fn request(ms: u64) -> MoveRequest {
        MoveRequest {
            piece: PieceId(0),
            from: Coord::new(0, 3),
            to: Coord::new(0, 0),
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_instant_ticket_is_ready() {
        let mut animator = InstantAnimator::default();
        let mut ticket = animator.request_move(request(300));
        assert!(ticket.poll_arrived());
        assert_eq!(animator.requests.len(), 1);
    }

    #[test]
    fn test_ticket_pending_until_arrival() {
        let (arrival, ticket) = move_channel();
        let mut ticket = task::spawn(ticket);
        assert_pending!(ticket.poll());
        arrival.arrive();
        assert!(ticket.is_woken());
        assert_ready!(ticket.poll());
    }

    #[test]
    fn test_dropped_arrival_counts_as_arrived() {
        let (arrival, mut ticket) = move_channel();
        assert!(!ticket.poll_arrived());
        drop(arrival);
        assert!(ticket.poll_arrived());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_animator_waits_for_duration() {
        let mut animator = TimedAnimator::new();
        let mut ticket = animator.request_move(request(200));
        tokio::task::yield_now().await;
        assert!(!ticket.poll_arrived());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(ticket.poll_arrived());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_animator_tiny_speed_saturates() {
        let mut animator = TimedAnimator { speed: 1e-30 };
        assert_eq!(animator.scaled(Duration::from_millis(200)), Duration::MAX);

        let mut ticket = animator.request_move(request(200));
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!ticket.poll_arrived());
    }

    #[test]
    fn test_timed_animator_scales_durations() {
        let fast = TimedAnimator { speed: 2.0 };
        assert_eq!(fast.scaled(Duration::from_millis(200)), Duration::from_millis(100));
        let stopped = TimedAnimator { speed: 0.0 };
        assert_eq!(stopped.scaled(Duration::from_millis(200)), Duration::ZERO);
        let nan = TimedAnimator { speed: f32::NAN };
        assert_eq!(nan.scaled(Duration::from_millis(200)), Duration::ZERO);
    }
}
