use serde::{Deserialize, Serialize};

use super::Coordinate;

// ============================================================================
// Distance & Travel Time Estimation
// ============================================================================
//
// Straight-line (haversine) distance only. There is no road-network routing
// anywhere in the system; every distance shown to an agent or customer is a
// great-circle approximation.
//
// ============================================================================

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Travel mode for ETA estimation.
///
/// Only driving is supported today; the enum exists so the telemetry schema
/// does not change if cycling couriers are added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    Driving,
}

impl TravelMode {
    /// Assumed average speed in km/h. A flat city-traffic figure, not a
    /// routing estimate.
    fn speed_kmh(self) -> f64 {
        match self {
            TravelMode::Driving => 30.0,
        }
    }
}

/// Great-circle distance between two points in kilometers.
///
/// Symmetric (`d(a, b) == d(b, a)`) and zero at identity.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = a.to_radians();
    let (lat2, lon2) = b.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // clamp guards against sqrt of a value nudged past 1.0 by rounding
    let c = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Travel time in minutes under a fixed-speed linear model.
///
/// Produces a plausible ETA for display, not a routing guarantee.
pub fn estimate_travel_time_minutes(distance_km: f64, mode: TravelMode) -> f64 {
    (distance_km / mode.speed_kmh()) * 60.0
}

/// True when `a` lies within `radius_km` of `b` (inclusive).
pub fn is_within_radius(a: Coordinate, b: Coordinate, radius_km: f64) -> bool {
    haversine_distance_km(a, b) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_distance_is_zero_at_identity() {
        let p = Coordinate::new(6.9271, 79.8612);
        assert!(haversine_distance_km(p, p).abs() < EPSILON);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(6.9271, 79.8612);
        let b = Coordinate::new(7.2906, 80.6337);
        assert!((haversine_distance_km(a, b) - haversine_distance_km(b, a)).abs() < EPSILON);
    }

    #[test]
    fn test_known_distance() {
        // Colombo to Kandy, roughly 94 km straight-line
        let colombo = Coordinate::new(6.9271, 79.8612);
        let kandy = Coordinate::new(7.2906, 80.6337);
        let d = haversine_distance_km(colombo, kandy);
        assert!(d > 90.0 && d < 100.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_distance() {
        // Antipodal points are half the circumference apart
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = haversine_distance_km(a, b);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half_circumference).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_radius_test_matches_distance() {
        let a = Coordinate::new(6.9271, 79.8612);
        let b = Coordinate::new(6.9280, 79.8620);
        let d = haversine_distance_km(a, b);
        assert!(is_within_radius(a, b, d + EPSILON));
        assert!(!is_within_radius(a, b, d - 0.001));
    }

    #[test]
    fn test_zero_radius_passes_only_identical_points() {
        let p = Coordinate::new(45.0, -120.0);
        assert!(is_within_radius(p, p, 0.0));
        let nearby = Coordinate::new(45.0001, -120.0);
        assert!(!is_within_radius(p, nearby, 0.0));
    }

    #[test]
    fn test_short_hop_distance() {
        // ~130 m hop used by the arrival threshold scenarios
        let current = Coordinate::new(6.9271, 79.8612);
        let destination = Coordinate::new(6.9280, 79.8620);
        let d = haversine_distance_km(current, destination);
        assert!(d > 0.1 && d < 0.2, "got {}", d);
    }

    #[test]
    fn test_travel_time_linear_model() {
        // 30 km at 30 km/h driving is one hour
        let minutes = estimate_travel_time_minutes(30.0, TravelMode::Driving);
        assert!((minutes - 60.0).abs() < EPSILON);

        assert!(estimate_travel_time_minutes(0.0, TravelMode::Driving).abs() < EPSILON);
    }
}
