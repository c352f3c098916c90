use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::cart::{CartLine, MenuPrice};
use crate::domain::delivery::{DeliveryStatus, OrderDetails, StatusChanged};
use crate::geo::Coordinate;

use super::{ApiError, CartStore, DeliveryBackend, DeliveryCompletion, MenuCatalog, ProgressUpdate};

// ============================================================================
// In-Memory Backend
// ============================================================================
//
// Backs the demo binary and the test suite. Behaves like the real backend in
// the ways that matter to the core: it validates transition order, records
// telemetry and completions, and can be told to fail its next call so the
// error paths get exercised.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryBackend {
    orders: Mutex<HashMap<Uuid, OrderDetails>>,
    history: Mutex<Vec<StatusChanged>>,
    telemetry: Mutex<Vec<(Uuid, ProgressUpdate)>>,
    completions: Mutex<HashMap<Uuid, DeliveryCompletion>>,
    catalog: Mutex<HashMap<Uuid, MenuPrice>>,
    carts: Mutex<HashMap<Uuid, Vec<CartLine>>>,
    fail_next: AtomicBool,
    fail_next_completion: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mutating call fail with a network error.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make only the next `complete_delivery` call fail, leaving the status
    /// write before it untouched. Models a hand-over that dies between the
    /// two backend writes.
    pub fn fail_next_completion(&self) {
        self.fail_next_completion.store(true, Ordering::SeqCst);
    }

    fn check_injected_failure(&self) -> Result<(), ApiError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Network("injected failure".to_string()));
        }
        Ok(())
    }

    pub async fn insert_order(&self, order: OrderDetails) {
        self.orders.lock().await.insert(order.id, order);
    }

    pub async fn insert_price(&self, price: MenuPrice) {
        self.catalog.lock().await.insert(price.price_id, price);
    }

    pub async fn order_status(&self, order_id: Uuid) -> Option<DeliveryStatus> {
        self.orders.lock().await.get(&order_id).map(|o| o.status)
    }

    pub async fn telemetry_for(&self, order_id: Uuid) -> Vec<ProgressUpdate> {
        self.telemetry
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, update)| update.clone())
            .collect()
    }

    pub async fn completion_for(&self, order_id: Uuid) -> Option<DeliveryCompletion> {
        self.completions.lock().await.get(&order_id).cloned()
    }

    pub async fn history_for(&self, order_id: Uuid) -> Vec<StatusChanged> {
        self.history
            .lock()
            .await
            .iter()
            .filter(|event| event.order_id == order_id)
            .cloned()
            .collect()
    }

    fn successor(status: DeliveryStatus) -> Option<DeliveryStatus> {
        match status {
            DeliveryStatus::Ready => Some(DeliveryStatus::OutForDelivery),
            DeliveryStatus::OutForDelivery => Some(DeliveryStatus::InTransit),
            DeliveryStatus::InTransit => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => None,
        }
    }
}

#[async_trait]
impl DeliveryBackend for InMemoryBackend {
    async fn fetch_order(&self, order_id: Uuid) -> Result<OrderDetails, ApiError> {
        self.orders
            .lock()
            .await
            .get(&order_id)
            .cloned()
            .ok_or(ApiError::OrderNotFound(order_id))
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: DeliveryStatus,
        location: Option<Coordinate>,
    ) -> Result<(), ApiError> {
        self.check_injected_failure()?;

        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(ApiError::OrderNotFound(order_id))?;

        // Forward-only: the backend refuses skipped or repeated phases
        if Self::successor(order.status) != Some(status) {
            return Err(ApiError::Rejected(format!(
                "cannot move order from {} to {}",
                order.status, status
            )));
        }

        let event = StatusChanged::new(order_id, order.status, status, location);
        order.status = status;
        drop(orders);

        self.history.lock().await.push(event);
        Ok(())
    }

    async fn update_delivery_progress(
        &self,
        order_id: Uuid,
        update: ProgressUpdate,
    ) -> Result<(), ApiError> {
        self.check_injected_failure()?;

        if !self.orders.lock().await.contains_key(&order_id) {
            return Err(ApiError::OrderNotFound(order_id));
        }
        self.telemetry.lock().await.push((order_id, update));
        Ok(())
    }

    async fn complete_delivery(
        &self,
        order_id: Uuid,
        completion: DeliveryCompletion,
    ) -> Result<(), ApiError> {
        self.check_injected_failure()?;
        if self.fail_next_completion.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Network("injected completion failure".to_string()));
        }

        if !self.orders.lock().await.contains_key(&order_id) {
            return Err(ApiError::OrderNotFound(order_id));
        }
        self.completions.lock().await.insert(order_id, completion);
        Ok(())
    }
}

#[async_trait]
impl MenuCatalog for InMemoryBackend {
    async fn resolve_price(&self, price_id: Uuid) -> Result<Option<MenuPrice>, ApiError> {
        Ok(self.catalog.lock().await.get(&price_id).cloned())
    }
}

#[async_trait]
impl CartStore for InMemoryBackend {
    async fn upsert_line(&self, customer_id: Uuid, line: &CartLine) -> Result<(), ApiError> {
        self.check_injected_failure()?;

        let mut carts = self.carts.lock().await;
        let lines = carts.entry(customer_id).or_default();
        match lines.iter_mut().find(|l| l.price_id == line.price_id) {
            Some(existing) => *existing = line.clone(),
            None => lines.push(line.clone()),
        }
        Ok(())
    }

    async fn remove_line(&self, customer_id: Uuid, price_id: Uuid) -> Result<(), ApiError> {
        self.check_injected_failure()?;

        let mut carts = self.carts.lock().await;
        if let Some(lines) = carts.get_mut(&customer_id) {
            lines.retain(|l| l.price_id != price_id);
        }
        Ok(())
    }

    async fn replace_cart(&self, customer_id: Uuid, lines: &[CartLine]) -> Result<(), ApiError> {
        self.check_injected_failure()?;

        self.carts
            .lock()
            .await
            .insert(customer_id, lines.to_vec());
        Ok(())
    }

    async fn fetch_summary(&self, customer_id: Uuid) -> Result<Vec<CartLine>, ApiError> {
        Ok(self
            .carts
            .lock()
            .await
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }
}
