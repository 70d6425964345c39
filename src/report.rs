//! GeoJSON export of detection results.
//!
//! The report is a `FeatureCollection` holding the drive track as a `LineString`
//! and one `Point` per fixed sighting of every flagged device. Any GeoJSON viewer
//! (geojson.io, QGIS, kepler.gl) can draw it; styling is left to the viewer.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{json, Value};

use crate::wigle::FIRST_SEEN_FORMAT;
use crate::{has_fix, Creeps, GpsPoint, Observation, Result};

/// Extension given to reports written next to the input log.
pub const REPORT_EXTENSION: &str = "geojson";

/// Path of the drive: one point per distinct `FirstSeen`, in log order.
///
/// WiGLE logs every device seen in a scan with the scan's timestamp and position,
/// so keeping the first row per timestamp gives one point per scan. Rows without
/// a fix are left out.
pub fn drive_track(observations: &[Observation]) -> Vec<GpsPoint> {
    let mut seen = HashSet::new();
    observations
        .iter()
        .filter(|obs| seen.insert(obs.first_seen))
        .filter(|obs| has_fix(obs))
        .map(Observation::position)
        .collect()
}

/// Build the GeoJSON report for a detection run.
pub fn to_geojson(observations: &[Observation], creeps: &Creeps) -> Value {
    let mut features = Vec::new();

    let track = drive_track(observations);
    if track.len() >= 2 {
        let coordinates: Vec<[f64; 2]> = track.iter().map(|p| [p.longitude, p.latitude]).collect();
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": { "kind": "track", "points": track.len() },
        }));
    }

    for creep in creeps {
        let extent = &creep.record.extent;
        for obs in &creep.history {
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [obs.longitude, obs.latitude] },
                "properties": {
                    "kind": "creep",
                    "mac": obs.device_id,
                    "ssid": obs.ssid,
                    "type": obs.device_type,
                    "first_seen": obs.first_seen.format(FIRST_SEEN_FORMAT).to_string(),
                    "rssi": obs.rssi,
                    "channel": obs.channel,
                    "rank": creep.record.rank,
                    "distance": extent.distance,
                    "unit": extent.unit.token(),
                },
            }));
        }
    }

    debug!("Report has {} features for {} creeps", features.len(), creeps.len());

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write a report as pretty-printed JSON.
pub fn write_report(path: impl AsRef<Path>, report: &Value) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, report).map_err(std::io::Error::from)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Report path used when none is given: the input with `.gz` dropped and the
/// extension replaced, so `drive.csv.gz` becomes `drive.geojson`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let is_gz = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let base = if is_gz { input.with_extension("") } else { input.to_path_buf() };
    base.with_extension(REPORT_EXTENSION)
}
