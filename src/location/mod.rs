// ============================================================================
// Location Source - Device Positioning Abstraction
// ============================================================================
//
// Wraps whatever positioning capability the host offers behind a trait:
// - one-shot fix with a hard timeout
// - continuous watch delivered over a cancellable subscription
//
// Failures are reported distinctly (permission vs unavailable vs timeout) and
// are never retried here; retrying is always an explicit caller decision.
//
// ============================================================================

pub mod error;
pub mod simulated;
pub mod source;
pub mod watch;

pub use error::LocationError;
pub use simulated::SimulatedLocationSource;
pub use source::{LocationConfig, LocationSource};
pub use watch::{LocationUpdate, LocationWatch};
