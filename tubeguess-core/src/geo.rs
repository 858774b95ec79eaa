//! Geographic coordinates and great-circle distance

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (the spherical model web map widgets use)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from GeoJSON-ordered `[longitude, latitude]`
    pub const fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and within range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: LatLng) -> f64 {
        haversine_distance(*self, other)
    }
}

/// Haversine distance between two points, in meters
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let sin_dlat = ((b.lat - a.lat).to_radians() / 2.0).sin();
    let sin_dlng = ((b.lng - a.lng).to_radians() / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Axis-aligned box in lat/lng space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Degenerate bounds around a single point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Smallest bounds containing every point; `None` for an empty slice
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for p in rest {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = LatLng::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // King's Cross St Pancras to Euston, roughly 750m apart
        let kings_cross = LatLng::new(51.5308, -0.1238);
        let euston = LatLng::new(51.5282, -0.1337);
        let d = kings_cross.distance_to(euston);
        assert!(d > 700.0 && d < 800.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance(LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = LatLng::new(51.5033, -0.1195);
        let b = LatLng::new(51.4613, -0.1156);
        assert!((a.distance_to(b) - b.distance_to(a)).abs() < 1e-9);
    }

    #[test]
    fn test_lng_lat_order() {
        let p = LatLng::from_lng_lat(-0.1278, 51.5074);
        assert_eq!(p.lat, 51.5074);
        assert_eq!(p.lng, -0.1278);
    }

    #[test]
    fn test_validity() {
        assert!(LatLng::new(51.5, -0.1).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 181.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds() {
        let a = LatLng::new(51.50, -0.20);
        let b = LatLng::new(51.55, -0.10);
        let bounds = LatLngBounds::from_points(&[b, a]).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(51.50, -0.20));
        assert_eq!(bounds.north_east, LatLng::new(51.55, -0.10));
        assert!(bounds.contains(LatLng::new(51.52, -0.15)));
        assert!(!bounds.contains(LatLng::new(51.60, -0.15)));
        let c = bounds.center();
        assert!((c.lat - 51.525).abs() < 1e-9);
        assert!((c.lng + 0.15).abs() < 1e-9);
        assert!(LatLngBounds::from_points(&[]).is_none());
    }
}
