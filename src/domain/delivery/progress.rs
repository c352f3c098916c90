use chrono::{DateTime, Duration, Utc};

use crate::geo::{
    estimate_travel_time_minutes, haversine_distance_km, is_within_radius, Coordinate, TravelMode,
};

use super::errors::DeliveryError;
use super::value_objects::{DeliveryPhase, DeliverySnapshot, DeliveryStatus, OrderDetails};

// ============================================================================
// Progress Computation
// ============================================================================
//
// Recomputed from scratch on every location tick. The progress percentage is
// a known heuristic: it assumes a 10 km route and maps remaining straight-line
// distance onto it, clamped to 0-100. It is monotonic as the agent closes in
// but says nothing about actual route geometry. Display-only.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Arrival radius; the only threshold gating the pickup/delivery
    /// affordance. 100 m.
    pub proximity_radius_km: f64,
    /// Secondary "almost there" warning radius, distinct from arrival.
    pub almost_there_km: f64,
    /// Assumed route length behind the progress percentage heuristic.
    /// Not a measured distance.
    pub assumed_max_distance_km: f64,
    pub travel_mode: TravelMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            proximity_radius_km: 0.1,
            almost_there_km: 0.5,
            assumed_max_distance_km: 10.0,
            travel_mode: TravelMode::Driving,
        }
    }
}

/// The destination appropriate to the current phase: vendor kitchen on the
/// pickup leg, customer drop-off on the delivery leg, none once delivered.
pub fn destination_for(
    status: DeliveryStatus,
    order: &OrderDetails,
) -> Result<Option<Coordinate>, DeliveryError> {
    match DeliveryPhase::for_status(status) {
        Some(DeliveryPhase::ToVendor) => Ok(Some(order.vendor.kitchen)),
        Some(DeliveryPhase::ToCustomer) => order
            .delivery_location
            .ok_or(DeliveryError::MissingDestination)
            .map(Some),
        None => Ok(None),
    }
}

/// Derive a fresh snapshot from one fix.
///
/// `leg_started` is false while the order sits in `ready`: the agent has not
/// begun moving, so ETA and progress are withheld rather than invented.
pub fn compute_snapshot(
    current: Coordinate,
    destination: Coordinate,
    leg_started: bool,
    now: DateTime<Utc>,
    config: &TrackerConfig,
) -> DeliverySnapshot {
    let distance_remaining_km = haversine_distance_km(current, destination);
    let at_destination = is_within_radius(current, destination, config.proximity_radius_km);
    let almost_there = distance_remaining_km <= config.almost_there_km;

    let (estimated_arrival, progress_percent) = if at_destination {
        (None, 100.0)
    } else if leg_started {
        let minutes = estimate_travel_time_minutes(distance_remaining_km, config.travel_mode);
        let eta = now + Duration::milliseconds((minutes * 60_000.0) as i64);
        let progress = ((config.assumed_max_distance_km - distance_remaining_km)
            / config.assumed_max_distance_km
            * 100.0)
            .clamp(0.0, 100.0);
        (Some(eta), progress)
    } else {
        (None, 0.0)
    };

    DeliverySnapshot {
        distance_remaining_km,
        estimated_arrival,
        progress_percent,
        at_destination,
        almost_there,
        computed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::value_objects::VendorLocation;
    use uuid::Uuid;

    fn sample_order(delivery_location: Option<Coordinate>) -> OrderDetails {
        OrderDetails {
            id: Uuid::new_v4(),
            order_number: OrderDetails::generate_order_number(),
            customer_id: Uuid::new_v4(),
            vendor: VendorLocation {
                vendor_id: Uuid::new_v4(),
                vendor_name: "Amma's Kitchen".to_string(),
                kitchen: Coordinate::new(6.9000, 79.8500),
                address: "12 Galle Road, Colombo".to_string(),
            },
            delivery_address: "45 Marine Drive, Colombo".to_string(),
            delivery_location,
            subtotal: 24.5,
            delivery_fee: 3.0,
            total_amount: 27.5,
            status: DeliveryStatus::Ready,
        }
    }

    #[test]
    fn test_destination_tracks_phase() {
        let dropoff = Coordinate::new(6.9280, 79.8620);
        let order = sample_order(Some(dropoff));

        assert_eq!(
            destination_for(DeliveryStatus::Ready, &order).unwrap(),
            Some(order.vendor.kitchen)
        );
        assert_eq!(
            destination_for(DeliveryStatus::OutForDelivery, &order).unwrap(),
            Some(order.vendor.kitchen)
        );
        assert_eq!(
            destination_for(DeliveryStatus::InTransit, &order).unwrap(),
            Some(dropoff)
        );
        assert_eq!(
            destination_for(DeliveryStatus::Delivered, &order).unwrap(),
            None
        );
    }

    #[test]
    fn test_missing_dropoff_coordinate_is_an_error() {
        let order = sample_order(None);
        let err = destination_for(DeliveryStatus::InTransit, &order).unwrap_err();
        assert!(matches!(err, DeliveryError::MissingDestination));
    }

    #[test]
    fn test_arrival_threshold_scenario() {
        let config = TrackerConfig::default();
        let destination = Coordinate::new(6.9280, 79.8620);
        let now = Utc::now();

        // ~130 m out: not yet arrived, but almost there
        let approaching = Coordinate::new(6.9271, 79.8612);
        let snapshot = compute_snapshot(approaching, destination, true, now, &config);
        assert!(snapshot.distance_remaining_km > 0.1);
        assert!(!snapshot.at_destination);
        assert!(snapshot.almost_there);
        assert!(snapshot.estimated_arrival.is_some());

        // One more fix, now under 100 m
        let arrived = Coordinate::new(6.92801, 79.86201);
        let snapshot = compute_snapshot(arrived, destination, true, now, &config);
        assert!(snapshot.distance_remaining_km < 0.1);
        assert!(snapshot.at_destination);
        assert_eq!(snapshot.progress_percent, 100.0);
        assert_eq!(snapshot.estimated_arrival, None);
    }

    #[test]
    fn test_progress_is_monotonic_as_distance_shrinks() {
        let config = TrackerConfig::default();
        let destination = Coordinate::new(6.9000, 79.8500);
        let now = Utc::now();

        let mut previous = -1.0;
        // Walk in along a meridian from ~8 km out
        for step in 0..8 {
            let lat = 6.9000 + (8 - step) as f64 * 0.009;
            let snapshot =
                compute_snapshot(Coordinate::new(lat, 79.8500), destination, true, now, &config);
            assert!(
                snapshot.progress_percent >= previous,
                "progress regressed at step {}",
                step
            );
            previous = snapshot.progress_percent;
        }
    }

    #[test]
    fn test_progress_clamps_beyond_assumed_route() {
        let config = TrackerConfig::default();
        let destination = Coordinate::new(6.9000, 79.8500);
        // ~55 km away, far past the assumed 10 km route
        let far = Coordinate::new(7.4000, 79.8500);
        let snapshot = compute_snapshot(far, destination, true, Utc::now(), &config);
        assert_eq!(snapshot.progress_percent, 0.0);
    }

    #[test]
    fn test_no_eta_before_leg_starts() {
        let config = TrackerConfig::default();
        let destination = Coordinate::new(6.9280, 79.8620);
        let current = Coordinate::new(6.9000, 79.8500);

        let snapshot = compute_snapshot(current, destination, false, Utc::now(), &config);
        assert_eq!(snapshot.estimated_arrival, None);
        assert_eq!(snapshot.progress_percent, 0.0);
        assert!(!snapshot.at_destination);
    }

    #[test]
    fn test_eta_uses_driving_model() {
        let config = TrackerConfig::default();
        let destination = Coordinate::new(6.9000, 79.8500);
        let now = Utc::now();
        // ~5 km north of the destination
        let current = Coordinate::new(6.9450, 79.8500);

        let snapshot = compute_snapshot(current, destination, true, now, &config);
        let eta = snapshot.estimated_arrival.unwrap();
        let expected_minutes =
            estimate_travel_time_minutes(snapshot.distance_remaining_km, TravelMode::Driving);
        let delta = (eta - now).num_seconds() as f64 / 60.0;
        assert!((delta - expected_minutes).abs() < 0.1);
    }
}
