//! Geodetic algorithms

pub mod distance;

pub use distance::haversine_distance_m;
