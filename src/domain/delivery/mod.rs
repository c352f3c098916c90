// ============================================================================
// Delivery Domain - Fulfillment State Machine & Progress
// ============================================================================
//
// This module contains ALL delivery-specific code:
// - Value objects (DeliveryStatus, DeliveryPhase, OrderDetails, snapshot)
// - Commands (agent-initiated transitions)
// - Events (status-change audit trail)
// - Errors (DeliveryError enum)
// - Progress computation (distance, ETA, progress percent, arrival gate)
//
// The status machine is strictly forward:
//   Ready -> OutForDelivery -> InTransit -> Delivered
// Each step is a single user-initiated command; proximity only enables the
// affordance, it never fires a transition by itself.
//
// ============================================================================

pub mod commands;
pub mod errors;
pub mod events;
pub mod progress;
pub mod value_objects;

pub use commands::DeliveryCommand;
pub use errors::DeliveryError;
pub use events::StatusChanged;
pub use progress::{compute_snapshot, destination_for, TrackerConfig};
pub use value_objects::{
    DeliveryPhase, DeliverySnapshot, DeliveryStatus, OrderDetails, VendorLocation,
};
