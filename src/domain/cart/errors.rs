use uuid::Uuid;

use crate::api::ApiError;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("No price with id {0} exists in the catalog")]
    NotFound(Uuid),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("No cart line references price {0}")]
    LineNotFound(Uuid),
}

/// Errors surfaced by the cart service: either a business rule violation or
/// a failure talking to the cart store. On a store failure the in-memory
/// cart is rolled back to its last-known-good state.
#[derive(Debug, thiserror::Error)]
pub enum CartServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] ApiError),
}
