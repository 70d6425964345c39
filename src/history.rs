//! Sighting history of a flagged device.
//!
//! WiGLE writes 0.0 for a coordinate when the phone had no GPS fix. Such rows are
//! dropped from the history, which also drops genuine fixes on the equator or the
//! prime meridian; there is no way to tell the two apart from the log alone.

use crate::Observation;

/// Whether the sighting carries a position fix (neither coordinate is exactly 0.0).
#[inline]
pub fn has_fix(obs: &Observation) -> bool {
    obs.latitude != 0.0 && obs.longitude != 0.0
}

/// Sightings of `device_id` that have a fix, oldest first.
///
/// Sightings with the same timestamp keep their log order. A device with no
/// fixed sightings yields an empty history.
///
/// # Example
/// ```
/// use creep_detector::{build_history, Observation};
///
/// let t0 = "2024-03-01T08:00:00".parse().unwrap();
/// let t1 = "2024-03-01T08:05:00".parse().unwrap();
/// let log = vec![
///     Observation::new("C", t1, 10.1, 10.1),
///     Observation::new("C", t0, 0.0, 0.0),
///     Observation::new("C", t0, 10.0, 10.0),
/// ];
///
/// let history = build_history(&log, "C");
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[0].latitude, 10.0);
/// ```
pub fn build_history(observations: &[Observation], device_id: &str) -> Vec<Observation> {
    let mut history: Vec<Observation> = observations
        .iter()
        .filter(|obs| obs.device_id == device_id && has_fix(obs))
        .cloned()
        .collect();

    // sort_by_key is stable
    history.sort_by_key(|obs| obs.first_seen);
    history
}
