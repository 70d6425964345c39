//! # Geographic Utilities
//!
//! Great-circle distance and distance units for extent scoring.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points, in meters |
//! | [`DistanceUnit`] | Output unit for extent distances (`km`, `m`, `mi`, `nmi`, `ft`, `in`, `rad`, `deg`) |
//! | [`diagonal_distance`] | Distance between the south-west and north-east corners of a [`Bounds`] |
//!
//! ## Example
//!
//! ```rust
//! use creep_detector::{GpsPoint, geo_utils::{self, DistanceUnit}};
//!
//! let london = GpsPoint::new(51.5074, -0.1278);
//! let paris = GpsPoint::new(48.8566, 2.3522);
//!
//! let meters = geo_utils::haversine_distance(&london, &paris);
//! let miles = DistanceUnit::Miles.from_meters(meters);
//! assert!((miles - 213.5).abs() < 2.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a sphere with the IUGG mean Earth radius
//! (6,371,008.8 m). The unit only rescales the result, so a device that is stationary
//! in one unit is stationary in all of them.

use std::fmt;
use std::str::FromStr;

use geo::{Distance, Haversine, Point};

use crate::{Bounds, Error, GpsPoint};

/// Mean Earth radius in meters, matching the radius `geo::Haversine` uses.
pub const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters.
///
/// ```rust
/// use creep_detector::{GpsPoint, geo_utils};
///
/// let p = GpsPoint::new(10.0, 10.0);
/// assert_eq!(geo_utils::haversine_distance(&p, &p), 0.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Distance between the (min_lat, min_lng) and (max_lat, max_lng) corners of `bounds`,
/// expressed in `unit`.
///
/// This is the bounding-box diagonal, not the largest distance between any two
/// observed points. A box collapsed to a single point scores 0.
pub fn diagonal_distance(bounds: &Bounds, unit: DistanceUnit) -> f64 {
    let south_west = GpsPoint::new(bounds.min_lat, bounds.min_lng);
    let north_east = GpsPoint::new(bounds.max_lat, bounds.max_lng);
    unit.from_meters(haversine_distance(&south_west, &north_east))
}

// =============================================================================
// Units
// =============================================================================

/// Unit in which extent distances and thresholds are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceUnit {
    Kilometers,
    Meters,
    #[default]
    Miles,
    NauticalMiles,
    Feet,
    Inches,
    /// Central angle on the unit sphere
    Radians,
    /// Central angle in degrees
    Degrees,
}

impl DistanceUnit {
    /// Every supported unit, in CLI token order.
    pub const ALL: [DistanceUnit; 8] = [
        DistanceUnit::Kilometers,
        DistanceUnit::Meters,
        DistanceUnit::Miles,
        DistanceUnit::NauticalMiles,
        DistanceUnit::Feet,
        DistanceUnit::Inches,
        DistanceUnit::Radians,
        DistanceUnit::Degrees,
    ];

    /// Short token used on the command line and in reports.
    pub fn token(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Meters => "m",
            DistanceUnit::Miles => "mi",
            DistanceUnit::NauticalMiles => "nmi",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Inches => "in",
            DistanceUnit::Radians => "rad",
            DistanceUnit::Degrees => "deg",
        }
    }

    /// Convert a surface distance in meters into this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        let km = meters / 1000.0;
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Meters => meters,
            DistanceUnit::Miles => km * 0.621_371_192,
            DistanceUnit::NauticalMiles => km * 0.539_956_803,
            DistanceUnit::Feet => km * 3_280.839_895_013,
            DistanceUnit::Inches => km * 39_370.078_740_158,
            DistanceUnit::Radians => meters / MEAN_EARTH_RADIUS_METERS,
            DistanceUnit::Degrees => (meters / MEAN_EARTH_RADIUS_METERS).to_degrees(),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistanceUnit::ALL
            .into_iter()
            .find(|unit| unit.token() == s)
            .ok_or_else(|| Error::UnsupportedUnit(s.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0));
    }

    #[test]
    fn test_unit_conversions() {
        let meters = 1_609.344;
        assert!(approx_eq(DistanceUnit::Miles.from_meters(meters), 1.0, 1e-6));
        assert!(approx_eq(DistanceUnit::Kilometers.from_meters(meters), 1.609344, 1e-9));
        assert_eq!(DistanceUnit::Meters.from_meters(meters), meters);
        assert!(approx_eq(DistanceUnit::Feet.from_meters(meters), 5280.0, 1e-3));
        assert!(approx_eq(DistanceUnit::Inches.from_meters(meters), 63_360.0, 1e-2));
        assert!(approx_eq(DistanceUnit::NauticalMiles.from_meters(1852.0), 1.0, 1e-6));
    }

    #[test]
    fn test_angular_units() {
        // A quarter of a meridian is 90 degrees of arc
        let quarter = std::f64::consts::FRAC_PI_2 * MEAN_EARTH_RADIUS_METERS;
        assert!(approx_eq(DistanceUnit::Radians.from_meters(quarter), std::f64::consts::FRAC_PI_2, 1e-12));
        assert!(approx_eq(DistanceUnit::Degrees.from_meters(quarter), 90.0, 1e-9));

        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(1.0, 0.0);
        assert!(approx_eq(DistanceUnit::Degrees.from_meters(haversine_distance(&a, &b)), 1.0, 1e-9));
    }

    #[test]
    fn test_unit_tokens_round_trip() {
        for unit in DistanceUnit::ALL {
            assert_eq!(unit.token().parse::<DistanceUnit>().unwrap(), unit);
        }
        assert_eq!(DistanceUnit::default(), DistanceUnit::Miles);
    }

    #[test]
    fn test_unsupported_unit() {
        let err = "furlong".parse::<DistanceUnit>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedUnit(ref t) if t == "furlong"));
        // Tokens are case sensitive
        assert!("KM".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn test_diagonal_distance_degenerate() {
        let bounds = Bounds { min_lat: 10.0, max_lat: 10.0, min_lng: 10.0, max_lng: 10.0 };
        for unit in DistanceUnit::ALL {
            assert_eq!(diagonal_distance(&bounds, unit), 0.0);
        }
    }

    #[test]
    fn test_diagonal_distance_uses_corners() {
        let bounds = Bounds { min_lat: 10.0, max_lat: 10.1, min_lng: 10.0, max_lng: 10.2 };
        let expected = haversine_distance(&GpsPoint::new(10.0, 10.0), &GpsPoint::new(10.1, 10.2));
        assert_eq!(diagonal_distance(&bounds, DistanceUnit::Meters), expected);
        assert!(expected > 24_000.0 && expected < 25_000.0);
    }
}
