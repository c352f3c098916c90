use std::time::Duration;

// ============================================================================
// Location Errors
// ============================================================================

/// Why a location fix could not be produced.
///
/// All three are recoverable: the UI shows a retry affordance and the user
/// decides whether to try again. Nothing here is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied by the user")]
    PermissionDenied,

    #[error("Location is unavailable on this device")]
    Unavailable,

    #[error("Location fix timed out after {0:?}")]
    Timeout(Duration),
}
