// ============================================================================
// Delivery Commands - Agent Intent
// ============================================================================
//
// Every status transition is one of these, issued by an explicit agent
// action. There is no command for skipping a phase; out-of-order intent is
// unrepresentable.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryCommand {
    /// Agent heads to the vendor kitchen.
    StartPickup,
    /// Agent has collected the food and heads to the customer.
    ConfirmPickup,
    /// Agent hands the order over.
    ConfirmDelivery { notes: Option<String> },
}

impl DeliveryCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryCommand::StartPickup => "start_pickup",
            DeliveryCommand::ConfirmPickup => "confirm_pickup",
            DeliveryCommand::ConfirmDelivery { .. } => "confirm_delivery",
        }
    }
}
