//! Per-device spatial extents and the distance threshold cut.
//!
//! Every device is reduced to the bounding box of all its sightings and scored by
//! the great-circle distance between the box's south-west and north-east corners.
//! The diagonal is a proxy for how far the device travelled: it overstates a device
//! that only visited two opposite corners and understates a long loop that ends
//! near where it started.

use std::collections::HashMap;

use log::debug;

use crate::geo_utils::{diagonal_distance, DistanceUnit};
use crate::{Bounds, Error, Observation, Result};

/// Bounding extent of one device's sightings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceExtent {
    pub device_id: String,
    /// Min/max taken per axis over all sightings, not from matched points
    pub bounds: Bounds,
    /// Number of sightings the extent was built from
    pub observation_count: usize,
    /// Corner-to-corner great-circle distance in `unit`
    pub distance: f64,
    pub unit: DistanceUnit,
}

/// A device whose extent distance reached the detection threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreepRecord {
    /// 1-based position in the descending distance ranking
    pub rank: usize,
    pub extent: DeviceExtent,
}

impl CreepRecord {
    pub fn device_id(&self) -> &str {
        &self.extent.device_id
    }

    pub fn distance(&self) -> f64 {
        self.extent.distance
    }
}

/// Compute the extent of every device in the log.
///
/// One pass folds each sighting into a per-device running bounding box, a second
/// pass scores the boxes. A device seen once gets distance 0.
///
/// # Errors
///
/// - [`Error::EmptyInput`] if `observations` is empty.
/// - [`Error::MalformedRecord`] for the first sighting with an empty device
///   identifier or a non-finite coordinate. Nothing is skipped: a box built from
///   part of a device's sightings would misstate its span.
///
/// # Example
/// ```
/// use creep_detector::{compute_extents, DistanceUnit, Observation};
///
/// let t = "2024-03-01T08:00:00".parse().unwrap();
/// let log = vec![
///     Observation::new("A", t, 10.0, 10.0),
///     Observation::new("A", t, 10.1, 10.2),
/// ];
///
/// let extents = compute_extents(&log, DistanceUnit::Kilometers).unwrap();
/// let a = &extents["A"];
/// assert_eq!((a.bounds.min_lat, a.bounds.max_lng), (10.0, 10.2));
/// assert!(a.distance > 24.0 && a.distance < 25.0);
/// ```
pub fn compute_extents(
    observations: &[Observation],
    unit: DistanceUnit,
) -> Result<HashMap<String, DeviceExtent>> {
    if observations.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut boxes: HashMap<&str, (Bounds, usize)> = HashMap::new();

    for (index, obs) in observations.iter().enumerate() {
        if obs.device_id.trim().is_empty() {
            return Err(Error::malformed(index, "missing device identifier"));
        }
        if !obs.latitude.is_finite() || !obs.longitude.is_finite() {
            return Err(Error::malformed(
                index,
                format!("{} has no usable latitude/longitude", obs.device_id),
            ));
        }

        let point = obs.position();
        boxes
            .entry(obs.device_id.as_str())
            .and_modify(|(bounds, count)| {
                bounds.extend(point);
                *count += 1;
            })
            .or_insert((Bounds::from_point(point), 1));
    }

    debug!(
        "Computed extents for {} devices from {} observations",
        boxes.len(),
        observations.len()
    );

    Ok(boxes
        .into_iter()
        .map(|(device_id, (bounds, observation_count))| {
            let extent = DeviceExtent {
                device_id: device_id.to_string(),
                bounds,
                observation_count,
                distance: diagonal_distance(&bounds, unit),
                unit,
            };
            (extent.device_id.clone(), extent)
        })
        .collect())
}

/// Keep the extents whose distance is at least `threshold`, most distant first.
///
/// The threshold is inclusive, so 0 keeps stationary devices too. Equal distances
/// are ordered by device identifier.
pub fn filter_by_threshold(extents: HashMap<String, DeviceExtent>, threshold: f64) -> Vec<CreepRecord> {
    let mut kept: Vec<DeviceExtent> = extents
        .into_values()
        .filter(|extent| extent.distance >= threshold)
        .collect();

    kept.sort_by(|a, b| {
        b.distance
            .total_cmp(&a.distance)
            .then_with(|| a.device_id.cmp(&b.device_id))
    });

    kept.into_iter()
        .enumerate()
        .map(|(i, extent)| CreepRecord { rank: i + 1, extent })
        .collect()
}
