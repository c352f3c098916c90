use std::time::Duration;

use async_trait::async_trait;

use crate::geo::Coordinate;

use super::{LocationError, LocationWatch};

// ============================================================================
// Location Source Trait
// ============================================================================

/// Tuning knobs for a location source.
#[derive(Clone, Debug)]
pub struct LocationConfig {
    /// Hard deadline for a one-shot fix before `LocationError::Timeout`.
    pub fix_timeout: Duration,
    /// Interval between updates on a watch subscription.
    pub watch_interval: Duration,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fix_timeout: Duration::from_secs(10),
            watch_interval: Duration::from_secs(3),
        }
    }
}

/// A positioning capability, injected into consumers rather than reached for
/// as ambient global state. Implementations own their polling lifecycle:
/// nothing runs until a fix or watch is requested, and a cancelled watch
/// tears the polling down.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Resolve a single fix, suspending the caller until the device responds,
    /// fails, or the configured timeout elapses. Never retried internally.
    async fn current_location(&self) -> Result<Coordinate, LocationError>;

    /// Start continuous delivery on its own schedule. Non-blocking; the
    /// returned watch is the only handle to stop it.
    fn watch_location(&self) -> LocationWatch;
}
