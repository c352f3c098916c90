use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

use super::commands::DeliveryCommand;
use super::errors::DeliveryError;

// ============================================================================
// Delivery Value Objects
// ============================================================================

/// Delivery-phase order status, strictly forward, no cycles.
///
/// Wire names match the backend's snake_case status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Awaiting pickup at the vendor.
    Ready,
    /// Agent en route to the vendor kitchen.
    OutForDelivery,
    /// Agent has the food and is en route to the customer.
    InTransit,
    /// Terminal.
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Ready => "ready",
            DeliveryStatus::OutForDelivery => "out_for_delivery",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }

    /// Resolve a command against the transition table. Anything not in the
    /// table is rejected and must leave the caller's status untouched.
    pub fn transition(self, command: &DeliveryCommand) -> Result<DeliveryStatus, DeliveryError> {
        match (self, command) {
            (DeliveryStatus::Ready, DeliveryCommand::StartPickup) => {
                Ok(DeliveryStatus::OutForDelivery)
            }
            (DeliveryStatus::OutForDelivery, DeliveryCommand::ConfirmPickup) => {
                Ok(DeliveryStatus::InTransit)
            }
            (DeliveryStatus::InTransit, DeliveryCommand::ConfirmDelivery { .. }) => {
                Ok(DeliveryStatus::Delivered)
            }
            (from, command) => Err(DeliveryError::InvalidTransition {
                from,
                attempted: command.name(),
            }),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which leg of the delivery the agent is on, derived from status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    /// Pickup leg: destination is the vendor kitchen.
    ToVendor,
    /// Drop-off leg: destination is the customer.
    ToCustomer,
}

impl DeliveryPhase {
    pub fn for_status(status: DeliveryStatus) -> Option<Self> {
        match status {
            DeliveryStatus::Ready | DeliveryStatus::OutForDelivery => Some(Self::ToVendor),
            DeliveryStatus::InTransit => Some(Self::ToCustomer),
            DeliveryStatus::Delivered => None,
        }
    }
}

/// The vendor side of an order: who cooks it and where to collect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorLocation {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub kitchen: Coordinate,
    pub address: String,
}

/// Read model of an order as the tracker needs it. Owned by the backend;
/// the tracker reads it and requests status transitions, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub vendor: VendorLocation,
    pub delivery_address: String,
    /// Geocoded drop-off point. Optional: some addresses never geocode.
    pub delivery_location: Option<Coordinate>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
    pub status: DeliveryStatus,
}

impl OrderDetails {
    /// Backend order-number scheme: `ORD-` + 8 uppercase hex chars.
    pub fn generate_order_number() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("ORD-{}", hex[..8].to_uppercase())
    }
}

/// Live progress derived on every location tick. No identity across ticks:
/// each snapshot supersedes the previous one, and a missing snapshot means
/// "unknown", never "reuse the last one".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliverySnapshot {
    pub distance_remaining_km: f64,
    pub estimated_arrival: Option<DateTime<Utc>>,
    /// 0-100, from the assumed-max-route heuristic. Display-only.
    pub progress_percent: f64,
    /// Within the arrival radius; gates the pickup/delivery affordance.
    pub at_destination: bool,
    /// Within the wider "almost there" radius.
    pub almost_there: bool,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert_eq!(
            DeliveryStatus::Ready
                .transition(&DeliveryCommand::StartPickup)
                .unwrap(),
            DeliveryStatus::OutForDelivery
        );
        assert_eq!(
            DeliveryStatus::OutForDelivery
                .transition(&DeliveryCommand::ConfirmPickup)
                .unwrap(),
            DeliveryStatus::InTransit
        );
        assert_eq!(
            DeliveryStatus::InTransit
                .transition(&DeliveryCommand::ConfirmDelivery { notes: None })
                .unwrap(),
            DeliveryStatus::Delivered
        );
    }

    #[test]
    fn test_skipping_a_phase_is_rejected() {
        // ready -> in_transit directly is not in the table
        let err = DeliveryStatus::Ready
            .transition(&DeliveryCommand::ConfirmPickup)
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::InvalidTransition {
                from: DeliveryStatus::Ready,
                ..
            }
        ));
    }

    #[test]
    fn test_terminal_state_accepts_nothing() {
        for command in [
            DeliveryCommand::StartPickup,
            DeliveryCommand::ConfirmPickup,
            DeliveryCommand::ConfirmDelivery { notes: None },
        ] {
            assert!(DeliveryStatus::Delivered.transition(&command).is_err());
        }
        assert!(DeliveryStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_phase_derivation() {
        assert_eq!(
            DeliveryPhase::for_status(DeliveryStatus::Ready),
            Some(DeliveryPhase::ToVendor)
        );
        assert_eq!(
            DeliveryPhase::for_status(DeliveryStatus::OutForDelivery),
            Some(DeliveryPhase::ToVendor)
        );
        assert_eq!(
            DeliveryPhase::for_status(DeliveryStatus::InTransit),
            Some(DeliveryPhase::ToCustomer)
        );
        assert_eq!(DeliveryPhase::for_status(DeliveryStatus::Delivered), None);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        assert_eq!(DeliveryStatus::InTransit.to_string(), "in_transit");
    }

    #[test]
    fn test_order_number_shape() {
        let number = OrderDetails::generate_order_number();
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
