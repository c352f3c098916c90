use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{CartLine, MenuPrice};
use crate::domain::delivery::{DeliveryStatus, OrderDetails, StatusChanged};
use crate::geo::Coordinate;

// Private module declaration
mod memory;

pub use memory::InMemoryBackend;

// ============================================================================
// External Collaborators - Backend API Surface
// ============================================================================
//
// The fulfillment core never owns orders, carts, or users; it talks to the
// marketplace backend through these traits. Everything is injected as
// `Arc<dyn ...>` so tests and the demo can run against the in-memory
// implementation below.
//
// No call here is ever retried automatically. A failure is surfaced to the
// caller, local state stays at its last-known-good value, and any retry is
// a fresh user action.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),
}

/// Telemetry pushed on each location tick to drive the counter-party's view.
/// Informational only; never authoritative for order status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current_location: Coordinate,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub distance_remaining_km: Option<f64>,
    pub status: DeliveryStatus,
}

/// Final hand-over record persisted alongside the terminal transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryCompletion {
    pub location: Option<Coordinate>,
    pub completion_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub status_history: Vec<StatusChanged>,
}

/// Order read + status mutation + telemetry + completion.
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    async fn fetch_order(&self, order_id: Uuid) -> Result<OrderDetails, ApiError>;

    /// Persist a status transition. The caller must not advance its local
    /// status until this returns `Ok`.
    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: DeliveryStatus,
        location: Option<Coordinate>,
    ) -> Result<(), ApiError>;

    async fn update_delivery_progress(
        &self,
        order_id: Uuid,
        update: ProgressUpdate,
    ) -> Result<(), ApiError>;

    async fn complete_delivery(
        &self,
        order_id: Uuid,
        completion: DeliveryCompletion,
    ) -> Result<(), ApiError>;
}

/// Price id resolution against the (external) menu catalog.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    async fn resolve_price(&self, price_id: Uuid) -> Result<Option<MenuPrice>, ApiError>;
}

/// Remote persistence for a customer's cart. The in-memory single-vendor
/// invariant holds regardless of what this store does; `replace_cart` exists
/// so a vendor switch reaches the store as one call rather than an
/// observable clear-then-add pair.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn upsert_line(&self, customer_id: Uuid, line: &CartLine) -> Result<(), ApiError>;

    async fn remove_line(&self, customer_id: Uuid, price_id: Uuid) -> Result<(), ApiError>;

    async fn replace_cart(&self, customer_id: Uuid, lines: &[CartLine]) -> Result<(), ApiError>;

    async fn fetch_summary(&self, customer_id: Uuid) -> Result<Vec<CartLine>, ApiError>;
}
