// Private module declaration
mod server;

use prometheus::{Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Location fixes (throughput, failures by kind)
// - Delivery progress (remaining distance, telemetry push latency)
// - Status transitions (applied and rejected)
// - Cart decisions (vendor conflicts, confirmed switches)
// - Active tracking sessions
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Location Metrics
    pub location_ticks_total: IntCounter,
    pub location_errors_total: IntCounterVec,

    // Delivery Metrics
    pub distance_remaining_km: Gauge,
    pub telemetry_push_duration: HistogramVec,

    // Transition Metrics
    pub status_transitions_total: IntCounterVec,
    pub transition_failures_total: IntCounterVec,

    // Cart Metrics
    pub vendor_conflicts_total: IntCounter,
    pub vendor_switches_total: IntCounter,

    // Session Metrics
    pub active_sessions: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Location Metrics
        let location_ticks_total = IntCounter::new(
            "location_ticks_total",
            "Total location fixes delivered to tracking sessions",
        )?;
        registry.register(Box::new(location_ticks_total.clone()))?;

        let location_errors_total = IntCounterVec::new(
            Opts::new("location_errors_total", "Location fix failures by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(location_errors_total.clone()))?;

        // Delivery Metrics
        let distance_remaining_km = Gauge::new(
            "delivery_distance_remaining_km",
            "Straight-line distance to the current phase destination",
        )?;
        registry.register(Box::new(distance_remaining_km.clone()))?;

        let telemetry_push_duration = HistogramVec::new(
            HistogramOpts::new(
                "telemetry_push_duration_seconds",
                "Time spent pushing progress telemetry to the backend",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(telemetry_push_duration.clone()))?;

        // Transition Metrics
        let status_transitions_total = IntCounterVec::new(
            Opts::new("status_transitions_total", "Applied order status transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_transitions_total.clone()))?;

        let transition_failures_total = IntCounterVec::new(
            Opts::new(
                "transition_failures_total",
                "Status transitions refused locally or rejected by the backend",
            ),
            &["to"],
        )?;
        registry.register(Box::new(transition_failures_total.clone()))?;

        // Cart Metrics
        let vendor_conflicts_total = IntCounter::new(
            "vendor_conflicts_total",
            "Cart additions blocked pending a vendor-switch decision",
        )?;
        registry.register(Box::new(vendor_conflicts_total.clone()))?;

        let vendor_switches_total = IntCounter::new(
            "vendor_switches_total",
            "Vendor switches confirmed by the customer",
        )?;
        registry.register(Box::new(vendor_switches_total.clone()))?;

        // Session Metrics
        let active_sessions = IntGauge::new(
            "active_tracking_sessions",
            "Tracking sessions currently holding a location watch",
        )?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            location_ticks_total,
            location_errors_total,
            distance_remaining_km,
            telemetry_push_duration,
            status_transitions_total,
            transition_failures_total,
            vendor_conflicts_total,
            vendor_switches_total,
            active_sessions,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a successful location tick
    pub fn record_tick(&self, distance_remaining_km: Option<f64>) {
        self.location_ticks_total.inc();
        if let Some(distance) = distance_remaining_km {
            self.distance_remaining_km.set(distance);
        }
    }

    /// Helper to record a location failure by kind
    pub fn record_location_error(&self, kind: &str) {
        self.location_errors_total.with_label_values(&[kind]).inc();
    }

    /// Helper to record a transition outcome
    pub fn record_transition(&self, from: &str, to: &str, success: bool) {
        if success {
            self.status_transitions_total
                .with_label_values(&[from, to])
                .inc();
        } else {
            self.transition_failures_total.with_label_values(&[to]).inc();
        }
    }

    /// Helper to record how long a telemetry push took
    pub fn record_telemetry_push(&self, duration_secs: f64, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.telemetry_push_duration
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_tick_updates_distance_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.record_tick(Some(2.5));
        metrics.record_tick(None);

        let gathered = metrics.registry.gather();
        let ticks = gathered
            .iter()
            .find(|m| m.name() == "location_ticks_total")
            .unwrap();
        assert_eq!(ticks.metric[0].counter.value, Some(2.0));

        let distance = gathered
            .iter()
            .find(|m| m.name() == "delivery_distance_remaining_km")
            .unwrap();
        assert_eq!(distance.metric[0].gauge.value, Some(2.5));
    }

    #[test]
    fn test_record_transition_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("ready", "out_for_delivery", true);
        metrics.record_transition("ready", "in_transit", false);

        let gathered = metrics.registry.gather();
        let applied = gathered
            .iter()
            .find(|m| m.name() == "status_transitions_total")
            .unwrap();
        assert_eq!(applied.metric[0].counter.value, Some(1.0));

        let failures = gathered
            .iter()
            .find(|m| m.name() == "transition_failures_total")
            .unwrap();
        assert_eq!(failures.metric[0].counter.value, Some(1.0));
    }

    #[test]
    fn test_record_location_errors_by_kind() {
        let metrics = Metrics::new().unwrap();
        metrics.record_location_error("timeout");
        metrics.record_location_error("timeout");
        metrics.record_location_error("unavailable");

        let gathered = metrics.registry.gather();
        let errors = gathered
            .iter()
            .find(|m| m.name() == "location_errors_total")
            .unwrap();
        assert_eq!(errors.metric.len(), 2); // Two distinct kinds
    }
}
