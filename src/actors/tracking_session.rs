use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::api::{ApiError, DeliveryBackend, DeliveryCompletion, ProgressUpdate};
use crate::domain::delivery::{
    compute_snapshot, destination_for, DeliveryCommand, DeliveryError, DeliveryPhase,
    DeliverySnapshot, DeliveryStatus, OrderDetails, StatusChanged, TrackerConfig,
};
use crate::geo::Coordinate;
use crate::location::{LocationError, LocationSource, LocationUpdate};
use crate::metrics::Metrics;

use super::{HealthMonitorActor, HealthStatus, UpdateHealth};

// ============================================================================
// Tracking Session Actor - One Order's Live Fulfillment
// ============================================================================
//
// Owns the delivery of a single order from `ready` to `delivered`:
// - subscribes to the location watch on start, cancels it on stop or on the
//   terminal transition (the GPS polling must not outlive the session)
// - recomputes the progress snapshot on every fix and pushes telemetry
// - serializes status transitions: the triggering control stays disabled
//   while a request is in flight, and local status only advances after the
//   backend confirms
//
// Transitions never fire from proximity. The snapshot's `at_destination`
// merely enables the affordance; the agent's explicit command drives it.
//
// ============================================================================

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct LocationTick(pub LocationUpdate);

/// Agent heads to the vendor kitchen: `ready -> out_for_delivery`.
#[derive(Message)]
#[rtype(result = "Result<DeliveryStatus, DeliveryError>")]
pub struct StartPickup;

/// Agent collected the food: `out_for_delivery -> in_transit`.
#[derive(Message)]
#[rtype(result = "Result<DeliveryStatus, DeliveryError>")]
pub struct ConfirmPickup;

/// Agent handed the order over: `in_transit -> delivered`.
#[derive(Message)]
#[rtype(result = "Result<DeliveryStatus, DeliveryError>")]
pub struct ConfirmDelivery {
    pub notes: Option<String>,
}

#[derive(Message)]
#[rtype(result = "TrackingView")]
pub struct GetProgress;

/// What the agent-facing UI renders: current status plus the latest
/// snapshot, or `None` when progress is unknown (no fix yet, fix failed,
/// or the phase just changed and no fresh fix has arrived).
#[derive(Debug, Clone)]
pub struct TrackingView {
    pub status: DeliveryStatus,
    pub snapshot: Option<DeliverySnapshot>,
    pub last_fix: Option<Coordinate>,
    pub transition_in_flight: bool,
}

impl TrackingView {
    /// Whether the UI should enable the pickup/delivery button.
    pub fn can_confirm_arrival(&self) -> bool {
        !self.transition_in_flight
            && self
                .snapshot
                .map(|s| s.at_destination)
                .unwrap_or(false)
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct StopTracking;

// ============================================================================
// Tracking Session Actor
// ============================================================================

pub struct TrackingSessionActor {
    order: OrderDetails,
    backend: Arc<dyn DeliveryBackend>,
    location: Arc<dyn LocationSource>,
    config: TrackerConfig,
    metrics: Arc<Metrics>,
    health: Option<Addr<HealthMonitorActor>>,
    snapshot: Option<DeliverySnapshot>,
    last_fix: Option<Coordinate>,
    history: Vec<StatusChanged>,
    transition_in_flight: bool,
    watch_cancel: Option<oneshot::Sender<()>>,
}

impl TrackingSessionActor {
    pub fn new(
        order: OrderDetails,
        backend: Arc<dyn DeliveryBackend>,
        location: Arc<dyn LocationSource>,
        config: TrackerConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            order,
            backend,
            location,
            config,
            metrics,
            health: None,
            snapshot: None,
            last_fix: None,
            history: Vec::new(),
            transition_in_flight: false,
            watch_cancel: None,
        }
    }

    pub fn with_health_monitor(mut self, health: Addr<HealthMonitorActor>) -> Self {
        self.health = Some(health);
        self
    }

    /// The leg is "started" once the agent has explicitly begun moving.
    /// While the order sits in `ready` no ETA or progress is invented.
    fn leg_started(&self) -> bool {
        self.order.status != DeliveryStatus::Ready
    }

    fn cancel_watch(&mut self) {
        if let Some(cancel) = self.watch_cancel.take() {
            let _ = cancel.send(());
        }
    }

    fn report_location_health(&self, status: HealthStatus) {
        if let Some(health) = &self.health {
            health.do_send(UpdateHealth {
                component: "location_source".to_string(),
                status,
                details: None,
            });
        }
    }

    fn recompute(&mut self, fix: Coordinate) {
        let destination = match destination_for(self.order.status, &self.order) {
            Ok(Some(destination)) => destination,
            Ok(None) => {
                // Terminal phase: nothing left to track
                self.metrics.record_tick(None);
                self.snapshot = None;
                return;
            }
            Err(e) => {
                self.metrics.record_tick(None);
                self.snapshot = None;
                tracing::warn!(order_id = %self.order.id, error = %e, "Cannot compute progress");
                return;
            }
        };

        let snapshot = compute_snapshot(fix, destination, self.leg_started(), Utc::now(), &self.config);
        self.metrics.record_tick(Some(snapshot.distance_remaining_km));

        if snapshot.at_destination {
            tracing::debug!(
                order_id = %self.order.id,
                distance_km = snapshot.distance_remaining_km,
                "Within arrival radius"
            );
        } else if snapshot.almost_there {
            tracing::debug!(
                order_id = %self.order.id,
                distance_km = snapshot.distance_remaining_km,
                "Almost there"
            );
        }

        self.snapshot = Some(snapshot);
    }

    /// Fire-and-forget telemetry for the counter-party's view. Failures are
    /// logged and counted, never retried: the next tick supersedes anyway.
    fn push_telemetry(&self, fix: Coordinate) {
        let update = ProgressUpdate {
            current_location: fix,
            estimated_arrival: self.snapshot.and_then(|s| s.estimated_arrival),
            distance_remaining_km: self.snapshot.map(|s| s.distance_remaining_km),
            status: self.order.status,
        };

        let backend = self.backend.clone();
        let metrics = self.metrics.clone();
        let order_id = self.order.id;

        actix::spawn(async move {
            let started = Instant::now();
            let result = backend.update_delivery_progress(order_id, update).await;
            metrics.record_telemetry_push(started.elapsed().as_secs_f64(), result.is_ok());
            if let Err(e) = result {
                tracing::warn!(order_id = %order_id, error = %e, "Telemetry push failed");
            }
        });
    }

    fn log_navigation(&self, status: DeliveryStatus) {
        match DeliveryPhase::for_status(status) {
            Some(DeliveryPhase::ToVendor) => tracing::info!(
                order_id = %self.order.id,
                target = %self.order.vendor.kitchen,
                address = %self.order.vendor.address,
                "Navigate to vendor kitchen"
            ),
            Some(DeliveryPhase::ToCustomer) => match self.order.delivery_location {
                Some(target) => tracing::info!(
                    order_id = %self.order.id,
                    target = %target,
                    address = %self.order.delivery_address,
                    "Navigate to customer"
                ),
                None => tracing::info!(
                    order_id = %self.order.id,
                    address = %self.order.delivery_address,
                    "Navigate to customer (address only)"
                ),
            },
            None => tracing::info!(order_id = %self.order.id, "Delivery complete"),
        }
    }

    /// Validate and run one transition. At most one request is in flight per
    /// session; local status moves only after the backend confirms, and a
    /// rejection leaves everything at its last-known-good value.
    fn run_transition(
        &mut self,
        command: DeliveryCommand,
    ) -> ResponseActFuture<Self, Result<DeliveryStatus, DeliveryError>> {
        if self.transition_in_flight {
            self.metrics
                .record_transition(self.order.status.as_str(), command.name(), false);
            return Box::pin(actix::fut::ready(Err(DeliveryError::TransitionInFlight)));
        }

        let from = self.order.status;
        let to = match from.transition(&command) {
            Ok(to) => to,
            Err(e) => {
                self.metrics.record_transition(from.as_str(), command.name(), false);
                tracing::warn!(order_id = %self.order.id, error = %e, "Transition refused locally");
                return Box::pin(actix::fut::ready(Err(e)));
            }
        };

        let notes = match &command {
            DeliveryCommand::ConfirmDelivery { notes } => notes.clone(),
            _ => None,
        };

        if to.is_terminal() {
            if let Some(snapshot) = &self.snapshot {
                if !snapshot.at_destination {
                    // Allowed (GPS may be off or wrong) but worth a trace
                    tracing::warn!(
                        order_id = %self.order.id,
                        distance_km = snapshot.distance_remaining_km,
                        "Completing delivery outside the arrival radius"
                    );
                }
            }
        }

        self.transition_in_flight = true;

        let backend = self.backend.clone();
        let order_id = self.order.id;
        let location = self.last_fix;
        let event = StatusChanged::new(order_id, from, to, location);
        let mut full_history = self.history.clone();
        full_history.push(event.clone());
        let is_final = to.is_terminal();

        tracing::info!(
            order_id = %self.order.id,
            from = %from,
            to = %to,
            "Requesting status transition"
        );

        Box::pin(
            async move {
                if let Err(e) = backend.update_order_status(order_id, to, location).await {
                    // A previous attempt may have persisted this status and
                    // then failed partway (e.g. the completion write). If the
                    // backend already holds the target status, the transition
                    // is applied; only the remaining work needs this retry.
                    match backend.fetch_order(order_id).await {
                        Ok(order) if order.status == to => {
                            tracing::info!(
                                order_id = %order_id,
                                status = %to,
                                "Backend already holds the target status, resuming"
                            );
                        }
                        _ => return Err(e),
                    }
                }
                if is_final {
                    backend
                        .complete_delivery(
                            order_id,
                            DeliveryCompletion {
                                location,
                                completion_time: Utc::now(),
                                notes,
                                status_history: full_history,
                            },
                        )
                        .await?;
                }
                Ok::<(), ApiError>(())
            }
            .into_actor(self)
            .map(move |result, act, _ctx| {
                act.transition_in_flight = false;
                match result {
                    Ok(()) => {
                        act.order.status = to;
                        act.history.push(event);
                        // The destination just changed; the old snapshot
                        // describes the previous leg, so drop it until a
                        // fresh fix arrives
                        act.snapshot = None;
                        act.metrics.record_transition(from.as_str(), to.as_str(), true);
                        act.log_navigation(to);
                        if to.is_terminal() {
                            act.cancel_watch();
                        }
                        Ok(to)
                    }
                    Err(e) => {
                        act.metrics.record_transition(from.as_str(), to.as_str(), false);
                        tracing::error!(
                            order_id = %act.order.id,
                            error = %e,
                            "Transition not applied; local status unchanged"
                        );
                        Err(DeliveryError::Backend(e))
                    }
                }
            }),
        )
    }
}

impl Actor for TrackingSessionActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            order_id = %self.order.id,
            order_number = %self.order.order_number,
            status = %self.order.status,
            "Tracking session started"
        );
        self.metrics.active_sessions.inc();

        let addr = ctx.address();
        let mut watch = self.location.watch_location();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        self.watch_cancel = Some(cancel_tx);

        // Forward watch updates into the mailbox; the oneshot lets the actor
        // cancel the watch (and with it the GPS polling) deterministically.
        actix::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        watch.cancel();
                        break;
                    }
                    update = watch.next() => match update {
                        Some(update) => addr.do_send(LocationTick(update)),
                        None => break,
                    },
                }
            }
            tracing::debug!("Location forwarding stopped");
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        self.cancel_watch();
        self.metrics.active_sessions.dec();
        tracing::info!(order_id = %self.order.id, "Tracking session stopped");
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<LocationTick> for TrackingSessionActor {
    type Result = ();

    fn handle(&mut self, msg: LocationTick, _: &mut Self::Context) {
        match msg.0 {
            Ok(fix) => {
                self.last_fix = Some(fix);
                self.recompute(fix);
                self.push_telemetry(fix);
                self.report_location_health(HealthStatus::Healthy);
            }
            Err(error) => {
                // Unknown beats stale: a failed fix voids the snapshot
                // entirely rather than letting the previous one pass as fresh
                self.snapshot = None;
                self.metrics.record_location_error(error_kind(&error));
                self.report_location_health(HealthStatus::Degraded(error.to_string()));
                tracing::warn!(
                    order_id = %self.order.id,
                    error = %error,
                    "Location update failed; progress unknown until the next fix"
                );
            }
        }
    }
}

impl Handler<StartPickup> for TrackingSessionActor {
    type Result = ResponseActFuture<Self, Result<DeliveryStatus, DeliveryError>>;

    fn handle(&mut self, _: StartPickup, _: &mut Self::Context) -> Self::Result {
        self.run_transition(DeliveryCommand::StartPickup)
    }
}

impl Handler<ConfirmPickup> for TrackingSessionActor {
    type Result = ResponseActFuture<Self, Result<DeliveryStatus, DeliveryError>>;

    fn handle(&mut self, _: ConfirmPickup, _: &mut Self::Context) -> Self::Result {
        self.run_transition(DeliveryCommand::ConfirmPickup)
    }
}

impl Handler<ConfirmDelivery> for TrackingSessionActor {
    type Result = ResponseActFuture<Self, Result<DeliveryStatus, DeliveryError>>;

    fn handle(&mut self, msg: ConfirmDelivery, _: &mut Self::Context) -> Self::Result {
        self.run_transition(DeliveryCommand::ConfirmDelivery { notes: msg.notes })
    }
}

impl Handler<GetProgress> for TrackingSessionActor {
    type Result = MessageResult<GetProgress>;

    fn handle(&mut self, _: GetProgress, _: &mut Self::Context) -> Self::Result {
        MessageResult(TrackingView {
            status: self.order.status,
            snapshot: self.snapshot,
            last_fix: self.last_fix,
            transition_in_flight: self.transition_in_flight,
        })
    }
}

impl Handler<StopTracking> for TrackingSessionActor {
    type Result = ();

    fn handle(&mut self, _: StopTracking, ctx: &mut Self::Context) {
        tracing::info!(order_id = %self.order.id, "Tracking session stop requested");
        self.cancel_watch();
        ctx.stop();
    }
}

fn error_kind(error: &LocationError) -> &'static str {
    match error {
        LocationError::PermissionDenied => "permission_denied",
        LocationError::Unavailable => "unavailable",
        LocationError::Timeout(_) => "timeout",
    }
}
