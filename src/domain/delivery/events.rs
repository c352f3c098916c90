use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

use super::value_objects::DeliveryStatus;

// ============================================================================
// Delivery Events - Status Audit Trail
// ============================================================================
//
// Mirrors the backend's order status history table: every applied transition
// is recorded with its timestamp and, when available, the agent's location
// at the moment of the change. Kept on the tracking session and attached to
// the completion payload.
//
// ============================================================================

/// A status transition that has been persisted and applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: Uuid,
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
    pub at: DateTime<Utc>,
    pub location: Option<Coordinate>,
}

impl StatusChanged {
    pub fn new(
        order_id: Uuid,
        from: DeliveryStatus,
        to: DeliveryStatus,
        location: Option<Coordinate>,
    ) -> Self {
        Self {
            order_id,
            from,
            to,
            at: Utc::now(),
            location,
        }
    }
}
