use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Cart Value Objects
// ============================================================================

/// Portion size a menu item is priced at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionSize {
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for PortionSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PortionSize::Small => "small",
            PortionSize::Medium => "medium",
            PortionSize::Large => "large",
        };
        f.write_str(label)
    }
}

/// A resolved catalog entry: one (food item, size) priced by one vendor.
/// This is what a price id dereferences to; the catalog itself is external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPrice {
    pub price_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub size: PortionSize,
    pub unit_price: f64,
    pub vendor_id: Uuid,
    pub vendor_name: String,
}

/// One line of a customer's cart, keyed by (food item, size) via the price id.
/// Owned exclusively by the cart aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub price_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub size: PortionSize,
    pub unit_price: f64,
    pub quantity: i32,
    pub vendor_id: Uuid,
    pub vendor_name: String,
}

impl CartLine {
    pub fn from_price(price: &MenuPrice, quantity: i32) -> Self {
        Self {
            price_id: price.price_id,
            food_id: price.food_id,
            food_name: price.food_name.clone(),
            size: price.size,
            unit_price: price.unit_price,
            quantity,
            vendor_id: price.vendor_id,
            vendor_name: price.vendor_name.clone(),
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// An addition held back by a vendor conflict, awaiting the customer's
/// confirm-or-cancel decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAddition {
    pub price: MenuPrice,
    pub quantity: i32,
}

/// Surfaced when an addition would mix two vendors in one cart. Not an
/// error: a decision point the customer must resolve explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorConflict {
    pub current_vendor_name: String,
    pub new_vendor_name: String,
    pub pending: PendingAddition,
}

/// Cart lines grouped under their owning vendor, for the summary view.
/// With the single-vendor invariant there is at most one group, but the
/// summary schema keeps the grouping explicit.
#[derive(Debug, Clone, Serialize)]
pub struct VendorGroup {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_price(vendor_name: &str, unit_price: f64) -> MenuPrice {
        MenuPrice {
            price_id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            food_name: "Kottu Roti".to_string(),
            size: PortionSize::Medium,
            unit_price,
            vendor_id: Uuid::new_v4(),
            vendor_name: vendor_name.to_string(),
        }
    }

    #[test]
    fn test_line_total() {
        let price = sample_price("Amma's Kitchen", 12.50);
        let line = CartLine::from_price(&price, 3);
        assert!((line.line_total() - 37.50).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_inherits_vendor_from_price() {
        let price = sample_price("Amma's Kitchen", 9.0);
        let line = CartLine::from_price(&price, 1);
        assert_eq!(line.vendor_id, price.vendor_id);
        assert_eq!(line.vendor_name, "Amma's Kitchen");
        assert_eq!(line.size, PortionSize::Medium);
    }

    #[test]
    fn test_cart_line_serialization() {
        let line = CartLine::from_price(&sample_price("Amma's Kitchen", 8.25), 2);
        let json = serde_json::to_string(&line).unwrap();
        let deserialized: CartLine = serde_json::from_str(&json).unwrap();
        assert_eq!(line, deserialized);
    }
}
