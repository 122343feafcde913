//! WGS84 coordinate type and conversions to the `geo` types

use crate::{NavError, Result};
use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees, latitude in [-90, 90] and longitude in [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if Self::in_range(latitude, longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(NavError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Check that both axes are finite and within their valid ranges
    #[inline]
    pub fn in_range(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        Self::in_range(self.latitude, self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Self {
            latitude: p.y(),
            longitude: p.x(),
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = Coordinate::new(51.5074, -0.1278).unwrap();
        assert!(c.is_valid());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_geo_point_uses_lon_as_x() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        let p: geo::Point<f64> = c.into();
        assert_eq!(p.x(), 20.0);
        assert_eq!(p.y(), 10.0);
        assert_eq!(Coordinate::from(p), c);
    }
}
