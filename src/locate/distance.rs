//! Great-circle distance.

use crate::models::GeoPoint;

/// Mean Earth radius used for distance estimates
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
///
/// Inputs are not range-checked. Identical points give exactly `0.0`.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h marginally outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Unrounded distance, or `None` when either point is not finite
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    Some(haversine_km(a, b))
}

/// Round a distance to one decimal for display
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Distance rounded to one decimal, or `None` when either point is not finite
pub fn rounded_distance_km(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    distance_km(a, b).map(round_km)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUNIS: GeoPoint = GeoPoint::new(36.8065, 10.1815);
    const SFAX: GeoPoint = GeoPoint::new(34.7406, 10.7603);

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_km(TUNIS, TUNIS), 0.0);
        assert_eq!(haversine_km(SFAX, SFAX), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let ab = haversine_km(TUNIS, SFAX);
        let ba = haversine_km(SFAX, TUNIS);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_paris_london_known_distance() {
        // Published great-circle distance is about 343.5 km
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        let d = haversine_km(paris, london);
        assert!((d - 343.5).abs() < 343.5 * 0.02, "got {d}");
    }

    #[test]
    fn test_tunis_sfax_in_expected_range() {
        let d = haversine_km(TUNIS, SFAX);
        assert!(d > 225.0 && d < 245.0, "got {d}");
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_rounded_distance() {
        assert_eq!(rounded_distance_km(TUNIS, TUNIS), Some(0.0));
        let d = rounded_distance_km(TUNIS, SFAX).unwrap();
        assert_eq!(d, (d * 10.0).round() / 10.0);
        assert_eq!(rounded_distance_km(GeoPoint::new(f64::NAN, 0.0), SFAX), None);
    }
}
