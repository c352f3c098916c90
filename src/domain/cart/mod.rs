// ============================================================================
// Cart Domain - Single-Vendor Cart Aggregate
// ============================================================================
//
// This module contains ALL cart-specific code:
// - Value objects (CartLine, MenuPrice, VendorConflict, ...)
// - Errors (CartError enum)
// - Aggregate (CartAggregate with the single-vendor invariant)
// - Service (CartService syncing the aggregate with the cart store)
//
// The one hard invariant of the whole system lives here: a cart either is
// empty or holds lines from exactly one vendor. Every mutation path either
// preserves that or refuses to run.
//
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod service;
pub mod value_objects;

pub use aggregate::{AddOutcome, CartAggregate};
pub use errors::{CartError, CartServiceError};
pub use service::CartService;
pub use value_objects::{
    CartLine, MenuPrice, PendingAddition, PortionSize, VendorConflict, VendorGroup,
};
