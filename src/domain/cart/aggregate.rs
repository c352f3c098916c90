use uuid::Uuid;

use super::errors::CartError;
use super::value_objects::{CartLine, MenuPrice, PendingAddition, VendorConflict, VendorGroup};

// ============================================================================
// Cart Aggregate - Single-Vendor Invariant
// ============================================================================
//
// Invariant: all lines share one vendor id, or the cart is empty.
//
// An addition that would break the invariant never mutates the cart; it is
// returned as a `VendorConflict` for the customer to resolve. Confirming the
// switch clears and re-adds inside one `&mut self` call, so no reader can
// observe a cart holding both vendors or a transient empty state.
//
// ============================================================================

/// Result of an accepted `add_item` call.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The line (possibly merged with an existing one) now in the cart.
    Added(CartLine),
    /// The addition would introduce a second vendor; cart untouched.
    Conflict(VendorConflict),
}

#[derive(Debug, Clone, Default)]
pub struct CartAggregate {
    lines: Vec<CartLine>,
}

impl CartAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The vendor currently owning this cart, if any.
    pub fn vendor(&self) -> Option<(Uuid, &str)> {
        self.lines
            .first()
            .map(|line| (line.vendor_id, line.vendor_name.as_str()))
    }

    fn validate_quantity(quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        Ok(())
    }

    /// Add `quantity` of a resolved price to the cart.
    ///
    /// Same vendor (or empty cart): merges into an existing line keyed by
    /// price id, or appends a new one. Different vendor: returns a
    /// `VendorConflict` and leaves every line untouched.
    pub fn add_item(&mut self, price: &MenuPrice, quantity: i32) -> Result<AddOutcome, CartError> {
        Self::validate_quantity(quantity)?;

        if let Some((vendor_id, vendor_name)) = self.vendor() {
            if vendor_id != price.vendor_id {
                return Ok(AddOutcome::Conflict(VendorConflict {
                    current_vendor_name: vendor_name.to_string(),
                    new_vendor_name: price.vendor_name.clone(),
                    pending: PendingAddition {
                        price: price.clone(),
                        quantity,
                    },
                }));
            }
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.price_id == price.price_id)
        {
            line.quantity += quantity;
            return Ok(AddOutcome::Added(line.clone()));
        }

        let line = CartLine::from_price(price, quantity);
        self.lines.push(line.clone());
        Ok(AddOutcome::Added(line))
    }

    /// Resolve a vendor conflict in favour of the new vendor: drop every
    /// existing line, then add the pending item. One borrow, one call; there
    /// is no observable state between the clear and the add.
    pub fn confirm_vendor_switch(
        &mut self,
        pending: PendingAddition,
    ) -> Result<CartLine, CartError> {
        Self::validate_quantity(pending.quantity)?;

        let line = CartLine::from_price(&pending.price, pending.quantity);
        self.lines.clear();
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Set the quantity on an existing line.
    pub fn update_quantity(&mut self, price_id: Uuid, quantity: i32) -> Result<CartLine, CartError> {
        Self::validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.price_id == price_id)
            .ok_or(CartError::LineNotFound(price_id))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    /// Remove a line entirely, returning it.
    pub fn remove_line(&mut self, price_id: Uuid) -> Result<CartLine, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.price_id == price_id)
            .ok_or(CartError::LineNotFound(price_id))?;
        Ok(self.lines.remove(idx))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_items(&self) -> i32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines grouped under their owning vendor. At most one group while the
    /// invariant holds; the summary schema keeps the grouping explicit.
    pub fn group_by_vendor(&self) -> Vec<VendorGroup> {
        let mut groups: Vec<VendorGroup> = Vec::new();
        for line in &self.lines {
            match groups.iter_mut().find(|g| g.vendor_id == line.vendor_id) {
                Some(group) => {
                    group.subtotal += line.line_total();
                    group.lines.push(line.clone());
                }
                None => groups.push(VendorGroup {
                    vendor_id: line.vendor_id,
                    vendor_name: line.vendor_name.clone(),
                    subtotal: line.line_total(),
                    lines: vec![line.clone()],
                }),
            }
        }
        groups
    }

    /// Invariant check used by tests and debug assertions.
    pub fn holds_single_vendor(&self) -> bool {
        match self.lines.first() {
            None => true,
            Some(first) => self.lines.iter().all(|l| l.vendor_id == first.vendor_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::value_objects::PortionSize;

    fn price_for(vendor_id: Uuid, vendor_name: &str, unit_price: f64) -> MenuPrice {
        MenuPrice {
            price_id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            food_name: "Rice & Curry".to_string(),
            size: PortionSize::Large,
            unit_price,
            vendor_id,
            vendor_name: vendor_name.to_string(),
        }
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = CartAggregate::new();
        let price = price_for(Uuid::new_v4(), "Vendor A", 10.0);

        let outcome = cart.add_item(&price, 2).unwrap();
        assert!(matches!(outcome, AddOutcome::Added(line) if line.quantity == 2));
        assert_eq!(cart.total_items(), 2);
        assert!(cart.holds_single_vendor());
    }

    #[test]
    fn test_same_price_merges_quantity() {
        let mut cart = CartAggregate::new();
        let price = price_for(Uuid::new_v4(), "Vendor A", 10.0);

        cart.add_item(&price, 2).unwrap();
        let outcome = cart.add_item(&price, 1).unwrap();

        assert!(matches!(outcome, AddOutcome::Added(line) if line.quantity == 3));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_second_vendor_conflicts_without_mutation() {
        let mut cart = CartAggregate::new();
        let vendor_a = Uuid::new_v4();
        let price_a = price_for(vendor_a, "Vendor A", 10.0);
        let price_b = price_for(Uuid::new_v4(), "Vendor B", 8.0);

        cart.add_item(&price_a, 2).unwrap();
        let outcome = cart.add_item(&price_b, 1).unwrap();

        match outcome {
            AddOutcome::Conflict(conflict) => {
                assert_eq!(conflict.current_vendor_name, "Vendor A");
                assert_eq!(conflict.new_vendor_name, "Vendor B");
                assert_eq!(conflict.pending.quantity, 1);
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        // Cart still holds only vendor A's line
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.vendor().unwrap().0, vendor_a);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_confirm_switch_replaces_cart_atomically() {
        let mut cart = CartAggregate::new();
        let price_a = price_for(Uuid::new_v4(), "Vendor A", 10.0);
        let price_b = price_for(Uuid::new_v4(), "Vendor B", 8.0);

        cart.add_item(&price_a, 2).unwrap();
        let conflict = match cart.add_item(&price_b, 3).unwrap() {
            AddOutcome::Conflict(c) => c,
            other => panic!("expected conflict, got {:?}", other),
        };

        cart.confirm_vendor_switch(conflict.pending).unwrap();

        assert_eq!(cart.lines().len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.vendor_name, "Vendor B");
        assert_eq!(line.quantity, 3);
        assert!(cart.holds_single_vendor());
    }

    #[test]
    fn test_cancel_leaves_cart_unchanged() {
        let mut cart = CartAggregate::new();
        let price_a = price_for(Uuid::new_v4(), "Vendor A", 10.0);
        let price_b = price_for(Uuid::new_v4(), "Vendor B", 8.0);

        cart.add_item(&price_a, 2).unwrap();
        let before = cart.lines().to_vec();

        // Cancelling is simply dropping the pending addition
        let _ = cart.add_item(&price_b, 1).unwrap();

        assert_eq!(cart.lines(), before.as_slice());
    }

    #[test]
    fn test_invariant_holds_under_add_sequences() {
        let mut cart = CartAggregate::new();
        let vendor_a = Uuid::new_v4();
        let vendor_b = Uuid::new_v4();

        for i in 0..10 {
            let price = if i % 2 == 0 {
                price_for(vendor_a, "Vendor A", 5.0)
            } else {
                price_for(vendor_b, "Vendor B", 6.0)
            };
            let _ = cart.add_item(&price, 1).unwrap();
            assert!(cart.holds_single_vendor());
        }

        // Only vendor A items were ever accepted
        assert_eq!(cart.vendor().unwrap().0, vendor_a);
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let mut cart = CartAggregate::new();
        let price = price_for(Uuid::new_v4(), "Vendor A", 10.0);

        assert_eq!(
            cart.add_item(&price, 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert_eq!(
            cart.add_item(&price, -2),
            Err(CartError::InvalidQuantity(-2))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_and_remove_lines() {
        let mut cart = CartAggregate::new();
        let price = price_for(Uuid::new_v4(), "Vendor A", 10.0);
        cart.add_item(&price, 2).unwrap();

        let updated = cart.update_quantity(price.price_id, 5).unwrap();
        assert_eq!(updated.quantity, 5);

        assert_eq!(
            cart.update_quantity(price.price_id, 0),
            Err(CartError::InvalidQuantity(0))
        );

        let missing = Uuid::new_v4();
        assert_eq!(
            cart.remove_line(missing),
            Err(CartError::LineNotFound(missing))
        );

        let removed = cart.remove_line(price.price_id).unwrap();
        assert_eq!(removed.quantity, 5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_and_grouping() {
        let mut cart = CartAggregate::new();
        let vendor_a = Uuid::new_v4();
        cart.add_item(&price_for(vendor_a, "Vendor A", 10.0), 2).unwrap();
        cart.add_item(&price_for(vendor_a, "Vendor A", 4.5), 1).unwrap();

        assert_eq!(cart.total_items(), 3);
        assert!((cart.total() - 24.5).abs() < f64::EPSILON);

        let groups = cart.group_by_vendor();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].vendor_name, "Vendor A");
        assert_eq!(groups[0].lines.len(), 2);
        assert!((groups[0].subtotal - 24.5).abs() < f64::EPSILON);
    }
}
