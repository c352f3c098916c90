use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{CartStore, MenuCatalog};
use crate::metrics::Metrics;

use super::aggregate::{AddOutcome, CartAggregate};
use super::errors::{CartError, CartServiceError};
use super::value_objects::{CartLine, PendingAddition, VendorGroup};

// ============================================================================
// Cart Service
// ============================================================================
//
// Orchestrates: catalog lookup -> aggregate mutation -> store sync.
//
// The aggregate mutex is the critical section: the vendor-switch
// clear-then-add and its store write happen under one lock, so no other cart
// mutation can interleave and no reader sees an intermediate state. If the
// store write fails, the in-memory cart is rolled back to the snapshot taken
// before the mutation; local state is never left optimistically advanced.
//
// ============================================================================

pub struct CartService {
    customer_id: Uuid,
    cart: Mutex<CartAggregate>,
    catalog: Arc<dyn MenuCatalog>,
    store: Arc<dyn CartStore>,
    metrics: Option<Arc<Metrics>>,
}

impl CartService {
    pub fn new(customer_id: Uuid, catalog: Arc<dyn MenuCatalog>, store: Arc<dyn CartStore>) -> Self {
        Self {
            customer_id,
            cart: Mutex::new(CartAggregate::new()),
            catalog,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Add an item by price id. A `VendorConflict` outcome is a decision
    /// point for the customer, not an error; the cart is untouched until
    /// they confirm or cancel.
    pub async fn add_item(
        &self,
        price_id: Uuid,
        quantity: i32,
    ) -> Result<AddOutcome, CartServiceError> {
        let price = self
            .catalog
            .resolve_price(price_id)
            .await?
            .ok_or(CartError::NotFound(price_id))?;

        let mut cart = self.cart.lock().await;
        let snapshot = cart.clone();

        match cart.add_item(&price, quantity)? {
            AddOutcome::Added(line) => {
                if let Err(e) = self.store.upsert_line(self.customer_id, &line).await {
                    *cart = snapshot;
                    return Err(e.into());
                }
                tracing::debug!(
                    customer_id = %self.customer_id,
                    food = %line.food_name,
                    quantity = line.quantity,
                    "Cart line added"
                );
                Ok(AddOutcome::Added(line))
            }
            AddOutcome::Conflict(conflict) => {
                if let Some(metrics) = &self.metrics {
                    metrics.vendor_conflicts_total.inc();
                }
                tracing::info!(
                    customer_id = %self.customer_id,
                    current_vendor = %conflict.current_vendor_name,
                    new_vendor = %conflict.new_vendor_name,
                    "Vendor conflict, awaiting customer decision"
                );
                Ok(AddOutcome::Conflict(conflict))
            }
        }
    }

    /// Resolve a vendor conflict in favour of the new vendor. The remote
    /// store receives the post-switch cart as a single `replace_cart` call.
    pub async fn confirm_vendor_switch(
        &self,
        pending: PendingAddition,
    ) -> Result<CartLine, CartServiceError> {
        let mut cart = self.cart.lock().await;
        let snapshot = cart.clone();

        let line = cart.confirm_vendor_switch(pending)?;
        if let Err(e) = self.store.replace_cart(self.customer_id, cart.lines()).await {
            *cart = snapshot;
            return Err(e.into());
        }

        if let Some(metrics) = &self.metrics {
            metrics.vendor_switches_total.inc();
        }
        tracing::info!(
            customer_id = %self.customer_id,
            vendor = %line.vendor_name,
            "Cart switched to new vendor"
        );
        Ok(line)
    }

    /// Discard a pending addition; the cart is untouched.
    pub fn cancel_vendor_switch(&self, pending: PendingAddition) {
        tracing::debug!(
            customer_id = %self.customer_id,
            vendor = %pending.price.vendor_name,
            "Vendor switch cancelled, pending item discarded"
        );
        drop(pending);
    }

    pub async fn update_quantity(
        &self,
        price_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartServiceError> {
        let mut cart = self.cart.lock().await;
        let snapshot = cart.clone();

        let line = cart.update_quantity(price_id, quantity)?;
        if let Err(e) = self.store.upsert_line(self.customer_id, &line).await {
            *cart = snapshot;
            return Err(e.into());
        }
        Ok(line)
    }

    pub async fn remove_line(&self, price_id: Uuid) -> Result<CartLine, CartServiceError> {
        let mut cart = self.cart.lock().await;
        let snapshot = cart.clone();

        let line = cart.remove_line(price_id)?;
        if let Err(e) = self.store.remove_line(self.customer_id, price_id).await {
            *cart = snapshot;
            return Err(e.into());
        }
        Ok(line)
    }

    pub async fn summary(&self) -> Vec<VendorGroup> {
        self.cart.lock().await.group_by_vendor()
    }

    pub async fn total(&self) -> f64 {
        self.cart.lock().await.total()
    }

    pub async fn total_items(&self) -> i32 {
        self.cart.lock().await.total_items()
    }

    pub async fn lines(&self) -> Vec<CartLine> {
        self.cart.lock().await.lines().to_vec()
    }
}
