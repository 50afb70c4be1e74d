//! Great-circle distance between geodetic coordinates

use crate::core::{Coordinate, EARTH_RADIUS_M};

/// Haversine distance between two coordinates in meters.
///
/// Uses a spherical Earth of radius [`EARTH_RADIUS_M`]. Equal points yield
/// exactly zero. Inputs are not validated, so out-of-range degrees are used
/// as given.
pub fn haversine_distance_m(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_points_are_zero() {
        let p = Coordinate::new(48.8566, 2.3522);
        assert_eq!(haversine_distance_m(&p, &p), 0.0);
    }

    #[test]
    fn test_one_millidegree_on_equator() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.001);
        let d = haversine_distance_m(&a, &b);
        assert!((d - 111.19).abs() < 0.01, "distance was {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinate::new(51.5074, -0.1278);
        let b = Coordinate::new(48.8566, 2.3522);
        let ab = haversine_distance_m(&a, &b);
        let ba = haversine_distance_m(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        // London to Paris is roughly 343.5 km
        assert!((ab / 1000.0 - 343.5).abs() < 1.0, "distance was {}", ab);
    }

    #[test]
    fn test_quarter_meridian() {
        let equator = Coordinate::new(0.0, 0.0);
        let pole = Coordinate::new(90.0, 0.0);
        let expected = EARTH_RADIUS_M * std::f64::consts::FRAC_PI_2;
        assert!((haversine_distance_m(&equator, &pole) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_values_propagate() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 360.0);
        // A full turn of longitude lands back on the start point
        assert!(haversine_distance_m(&a, &b) < 1e-6);
    }
}
