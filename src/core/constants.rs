//! Physical constants and unit conversions

/// Mean Earth radius used by the haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Multiplier converting meters per second to kilometers per hour
pub const MPS_TO_KMH: f64 = 3.6;

/// Meters in one kilometer
pub const METERS_PER_KM: f64 = 1000.0;

/// Milliseconds in one second
pub const MS_PER_SECOND: f64 = 1000.0;

/// Default average fuel economy of the bike (km per litre)
pub const DEFAULT_AVERAGE_KM_PER_LITRE: f64 = 40.0;

/// Default number of finished rides kept in the trip log
pub const DEFAULT_TRIP_LOG_CAPACITY: usize = 5;
