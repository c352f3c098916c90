use tokio::sync::mpsc;

use crate::geo::Coordinate;

use super::LocationError;

// ============================================================================
// Location Watch - Cancellable Update Subscription
// ============================================================================
//
// Replaces callback-style positioning APIs with an explicit channel:
// updates arrive in delivery order, errors travel in-band, and cancellation
// is deterministic. Once `cancel` returns, `next` yields `None` and the
// producer task winds down on its next send attempt.
//
// The caller owns the watch. Dropping it without cancelling also closes the
// channel, so the underlying polling cannot outlive its consumer.
//
// ============================================================================

/// A single delivery on the watch channel: a fresh fix or a fix failure.
pub type LocationUpdate = Result<Coordinate, LocationError>;

/// Receiving half of a location subscription.
pub struct LocationWatch {
    rx: mpsc::Receiver<LocationUpdate>,
    cancelled: bool,
}

impl LocationWatch {
    /// Channel capacity for in-flight updates. Small on purpose: a stale
    /// backlog of fixes is worse than dropping the producer into backpressure.
    const BUFFER: usize = 8;

    /// Create a watch plus the sender its producer pushes updates into.
    pub fn channel() -> (mpsc::Sender<LocationUpdate>, Self) {
        let (tx, rx) = mpsc::channel(Self::BUFFER);
        (
            tx,
            Self {
                rx,
                cancelled: false,
            },
        )
    }

    /// Await the next update. Returns `None` once the watch is cancelled or
    /// the producer has gone away.
    pub async fn next(&mut self) -> Option<LocationUpdate> {
        if self.cancelled {
            return None;
        }
        self.rx.recv().await
    }

    /// Stop delivery. After this returns, no further update is observable
    /// through `next`, including updates already buffered.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.rx.close();
        // Drain anything that raced in before close so buffered fixes are
        // not replayable by a later caller.
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
