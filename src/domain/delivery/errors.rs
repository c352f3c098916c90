use crate::api::ApiError;

use super::value_objects::DeliveryStatus;

// ============================================================================
// Delivery Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Cannot {attempted} while order is {from}")]
    InvalidTransition {
        from: DeliveryStatus,
        attempted: &'static str,
    },

    #[error("A status transition for this order is already in flight")]
    TransitionInFlight,

    #[error("Order has no geocoded drop-off coordinate")]
    MissingDestination,

    #[error("Backend rejected the transition: {0}")]
    Backend(#[from] ApiError),
}
