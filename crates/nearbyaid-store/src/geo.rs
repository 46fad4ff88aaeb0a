//! Great-circle helpers backing the radius query.
//!
//! Distances are measured on a sphere of radius [`EARTH_RADIUS_M`], the
//! same spherical model used by document stores' `2dsphere` indexes.

use std::f64::consts::{FRAC_PI_2, PI};

use nearbyaid_shared::GeoPoint;

/// Mean Earth radius used for spherical distance (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Padding added around every bounding box (radians) so that points lying
/// exactly on the radius are not lost to floating-point rounding.
const BOX_EPSILON: f64 = 1e-9;

/// Haversine distance in meters.
pub fn distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// An axis-aligned longitude/latitude rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl LonLatBox {
    const WORLD: LonLatBox = LonLatBox {
        min_lon: -180.0,
        max_lon: 180.0,
        min_lat: -90.0,
        max_lat: 90.0,
    };

    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.min_lon..=self.max_lon).contains(&p.lon)
            && (self.min_lat..=self.max_lat).contains(&p.lat)
    }
}

/// Rectangles that together cover every point within `radius_m` of `center`.
///
/// Returns two rectangles when the circle crosses the antimeridian and the
/// whole globe when it covers a pole. Out-of-range centers are not
/// rejected: the longitude is wrapped and an out-of-range latitude falls
/// back to the whole globe, leaving the exact distance check to decide.
pub fn bounding_boxes(center: &GeoPoint, radius_m: f64) -> Vec<LonLatBox> {
    let angular = radius_m / EARTH_RADIUS_M + BOX_EPSILON;
    let lat = center.lat.to_radians();

    if angular >= PI || !(-FRAC_PI_2..=FRAC_PI_2).contains(&lat) {
        return vec![LonLatBox::WORLD];
    }

    let min_lat = lat - angular;
    let max_lat = lat + angular;
    if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
        return vec![LonLatBox {
            min_lat: if min_lat <= -FRAC_PI_2 { -90.0 } else { min_lat.to_degrees() },
            max_lat: if max_lat >= FRAC_PI_2 { 90.0 } else { max_lat.to_degrees() },
            ..LonLatBox::WORLD
        }];
    }

    let dlon = (angular.sin() / lat.cos()).clamp(-1.0, 1.0).asin();
    let lon = wrap_longitude(center.lon).to_radians();
    let (min_lon, max_lon) = (lon - dlon, lon + dlon);
    let (min_lat, max_lat) = (min_lat.to_degrees(), max_lat.to_degrees());

    let slice = |lo: f64, hi: f64| LonLatBox {
        min_lon: lo.to_degrees(),
        max_lon: hi.to_degrees(),
        min_lat,
        max_lat,
    };

    if min_lon < -PI {
        vec![slice(min_lon + 2.0 * PI, PI), slice(-PI, max_lon)]
    } else if max_lon > PI {
        vec![slice(min_lon, PI), slice(-PI, max_lon - 2.0 * PI)]
    } else {
        vec![slice(min_lon, max_lon)]
    }
}

/// Map any finite longitude into `[-180, 180)`.
fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varanasi() -> GeoPoint {
        GeoPoint::from_lat_lng(25.3176, 82.9739)
    }

    #[test]
    fn test_distance_zero_and_symmetric() {
        let a = varanasi();
        let b = GeoPoint::from_lat_lng(25.30, 82.97);
        assert_eq!(distance_m(&a, &a), 0.0);
        assert!((distance_m(&a, &b) - distance_m(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((distance_m(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_swapped_order_is_far_away() {
        // lat/lng reversed lands in a different part of the world
        let right = GeoPoint::from_lat_lng(25.30, 82.97);
        let swapped = GeoPoint::new(25.30, 82.97);
        assert!(distance_m(&right, &swapped) > 5_000_000.0);
    }

    #[test]
    fn test_box_covers_circle() {
        let center = varanasi();
        let boxes = bounding_boxes(&center, 10_000.0);
        assert_eq!(boxes.len(), 1);
        let b = boxes[0];
        assert!(b.contains(&center));
        // Points at the cardinal extremes of the circle stay inside.
        let dlat = (10_000.0 / EARTH_RADIUS_M).to_degrees();
        assert!(b.contains(&GeoPoint::new(center.lon, center.lat + dlat * 0.999)));
        assert!(b.contains(&GeoPoint::new(center.lon, center.lat - dlat * 0.999)));
        assert!(!b.contains(&GeoPoint::new(center.lon, center.lat + 1.0)));
    }

    #[test]
    fn test_box_splits_at_antimeridian() {
        let center = GeoPoint::new(179.99, 0.0);
        let boxes = bounding_boxes(&center, 50_000.0);
        assert_eq!(boxes.len(), 2);
        assert!(boxes.iter().any(|b| b.contains(&GeoPoint::new(-179.9, 0.0))));
        assert!(boxes.iter().any(|b| b.contains(&GeoPoint::new(179.9, 0.0))));
    }

    #[test]
    fn test_box_near_pole_spans_all_longitudes() {
        let boxes = bounding_boxes(&GeoPoint::new(10.0, 89.99), 5_000.0);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].min_lon, -180.0);
        assert_eq!(boxes[0].max_lon, 180.0);
        assert_eq!(boxes[0].max_lat, 90.0);
    }

    #[test]
    fn test_out_of_range_center_does_not_panic() {
        let boxes = bounding_boxes(&GeoPoint::new(400.0, 200.0), 1_000.0);
        assert_eq!(boxes, vec![LonLatBox::WORLD]);
        let boxes = bounding_boxes(&GeoPoint::new(540.0, 10.0), 1_000.0);
        assert_eq!(boxes.len(), 2);
    }
}
