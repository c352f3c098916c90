// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for the live tracking side of the system.
//
// Structure:
// - tracking_session - one actor per order being tracked by an agent
// - health_monitor   - aggregates component health across the process
//
// Note: Domain logic (cart, transition table, progress math) lives in
//       `crate::domain` and is driven from here; actors only orchestrate.
//
// ============================================================================

mod health_monitor;
mod tracking_session;

pub use health_monitor::{
    ComponentHealth, GetSystemHealth, HealthMonitorActor, HealthStatus, SystemHealth, UpdateHealth,
};
pub use tracking_session::{
    ConfirmDelivery, ConfirmPickup, GetProgress, LocationTick, StartPickup, StopTracking,
    TrackingSessionActor, TrackingView,
};
