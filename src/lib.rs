//! # Creep Detector
//!
//! Finds wireless devices that were seen across an unusually large area in a
//! geolocated wardriving log (WiGLE CSV). A phone, tracker or hotspot that keeps
//! showing up while you drive around is a "creep"; a stationary access point is not.
//!
//! This library provides:
//! - Per-device bounding extents scored by great-circle distance ([`extent`])
//! - Cleaned, time-ordered sighting history for flagged devices ([`history`])
//! - A WiGLE CSV loader, plain or gzip-compressed ([`wigle`])
//! - GeoJSON export of the results ([`report`], `serde` feature)
//!
//! ## Features
//!
//! - **`serde`** - Serialization and the GeoJSON report writer
//! - **`parallel`** - Detect over several logs at once with rayon
//! - **`cli`** - The `creep-detector` binary (default)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use creep_detector::{detect_creeps, DetectConfig, DistanceUnit, Observation};
//!
//! let t0 = "2024-03-01T08:00:00".parse().unwrap();
//! let t1 = "2024-03-01T08:20:00".parse().unwrap();
//! let log = vec![
//!     Observation::new("aa:bb:cc:00:00:01", t0, 51.5074, -0.1278),
//!     Observation::new("aa:bb:cc:00:00:01", t1, 51.5600, -0.2000),
//!     Observation::new("aa:bb:cc:00:00:02", t0, 51.5074, -0.1278),
//! ];
//!
//! let config = DetectConfig { threshold: 0.2, unit: DistanceUnit::Miles };
//! let creeps = detect_creeps(&log, &config).unwrap();
//!
//! assert_eq!(creeps.len(), 1);
//! assert_eq!(creeps.get("aa:bb:cc:00:00:01").unwrap().len(), 2);
//! ```

use chrono::NaiveDateTime;
use log::debug;

pub mod error;
pub use error::{Error, Result};

pub mod geo_utils;
pub use geo_utils::DistanceUnit;

// Extent scoring and threshold cut
pub mod extent;
pub use extent::{compute_extents, filter_by_threshold, CreepRecord, DeviceExtent};

// History reconstruction for flagged devices
pub mod history;
pub use history::{build_history, has_fix};

// WiGLE CSV loading
pub mod wigle;

// GeoJSON export
#[cfg(feature = "serde")]
pub mod report;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use creep_detector::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Bounding box of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Degenerate bounds around a single point.
    pub fn from_point(point: GpsPoint) -> Self {
        Self {
            min_lat: point.latitude,
            max_lat: point.latitude,
            min_lng: point.longitude,
            max_lng: point.longitude,
        }
    }

    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for p in rest {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    /// Grow the bounds to cover `point`. Each axis is widened independently.
    pub fn extend(&mut self, point: GpsPoint) {
        self.min_lat = self.min_lat.min(point.latitude);
        self.max_lat = self.max_lat.max(point.latitude);
        self.min_lng = self.min_lng.min(point.longitude);
        self.max_lng = self.max_lng.max(point.longitude);
    }
}

/// One sighting of a radio device in the log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Hardware address (MAC) the sighting is keyed by
    pub device_id: String,
    /// When the device was first seen at this position
    pub first_seen: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub channel: i32,
    /// Signal strength in dBm
    pub rssi: i32,
    /// Network name, empty for hidden networks and non-WiFi devices
    pub ssid: String,
    /// Device type tag (`WIFI`, `BT`, `BLE`, `GSM`, ...)
    pub device_type: String,
}

impl Observation {
    /// Create an observation with empty radio metadata.
    pub fn new(device_id: impl Into<String>, first_seen: NaiveDateTime, latitude: f64, longitude: f64) -> Self {
        Self {
            device_id: device_id.into(),
            first_seen,
            latitude,
            longitude,
            channel: 0,
            rssi: 0,
            ssid: String::new(),
            device_type: String::new(),
        }
    }

    /// Position of the sighting.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Configuration for creep detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectConfig {
    /// Minimum extent distance (inclusive) for a device to be flagged.
    /// Default: 0.2
    pub threshold: f64,

    /// Unit of `threshold` and of reported distances.
    /// Default: miles
    pub unit: DistanceUnit,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            unit: DistanceUnit::Miles,
        }
    }
}

/// A flagged device with its extent and cleaned history.
#[derive(Debug, Clone, PartialEq)]
pub struct Creep {
    pub record: CreepRecord,
    /// Sightings with a position fix, oldest first. May be empty.
    pub history: Vec<Observation>,
}

impl Creep {
    pub fn device_id(&self) -> &str {
        &self.record.extent.device_id
    }
}

/// Detection result: device identifier to history, most extreme device first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Creeps {
    entries: Vec<Creep>,
}

impl Creeps {
    /// Number of flagged devices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flagged devices in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Creep> {
        self.entries.iter()
    }

    /// Device identifiers in rank order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Creep::device_id)
    }

    /// History of a flagged device, `None` if the device was not flagged.
    pub fn get(&self, device_id: &str) -> Option<&[Observation]> {
        self.creep(device_id).map(|c| c.history.as_slice())
    }

    /// Full entry of a flagged device.
    pub fn creep(&self, device_id: &str) -> Option<&Creep> {
        self.entries.iter().find(|c| c.device_id() == device_id)
    }

    pub fn into_vec(self) -> Vec<Creep> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Creeps {
    type Item = &'a Creep;
    type IntoIter = std::slice::Iter<'a, Creep>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Core Functions
// ============================================================================

/// Flag devices whose extent distance reaches `config.threshold` and attach
/// their cleaned history.
///
/// Any error from extent computation aborts the whole run; no partial result
/// is returned.
///
/// # Example
/// ```
/// use creep_detector::{detect_creeps, DetectConfig, Error};
///
/// let result = detect_creeps(&[], &DetectConfig::default());
/// assert!(matches!(result, Err(Error::EmptyInput)));
/// ```
pub fn detect_creeps(observations: &[Observation], config: &DetectConfig) -> Result<Creeps> {
    let extents = compute_extents(observations, config.unit)?;
    let device_count = extents.len();
    let records = filter_by_threshold(extents, config.threshold);

    debug!(
        "{} of {} devices reach {} {}",
        records.len(),
        device_count,
        config.threshold,
        config.unit
    );

    let entries = records
        .into_iter()
        .map(|record| {
            let history = build_history(observations, &record.extent.device_id);
            Creep { record, history }
        })
        .collect();

    Ok(Creeps { entries })
}

/// Run [`detect_creeps`] over several independent logs in parallel.
///
/// Results are returned in the order of `logs`; one failing log does not
/// affect the others.
#[cfg(feature = "parallel")]
pub fn detect_creeps_many(logs: &[Vec<Observation>], config: &DetectConfig) -> Vec<Result<Creeps>> {
    use rayon::prelude::*;

    logs.par_iter()
        .map(|log| detect_creeps(log, config))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
