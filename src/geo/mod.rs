// ============================================================================
// Geodesy Module - Pure Coordinate Math
// ============================================================================
//
// Stateless helpers shared by the delivery tracker:
// - Coordinate value type with display formatting
// - Haversine great-circle distance
// - Fixed-speed travel time estimation
// - Proximity (radius) tests
//
// No I/O, no clocks, no state. Everything here is a pure function.
//
// ============================================================================

pub mod coordinate;
pub mod distance;

pub use coordinate::Coordinate;
pub use distance::{
    estimate_travel_time_minutes, haversine_distance_km, is_within_radius, TravelMode,
    EARTH_RADIUS_KM,
};
