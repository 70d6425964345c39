//! Basic example of flagging a device that follows a drive.
//!
//! Run with: cargo run --example basic_detection

use chrono::{Duration, NaiveDateTime};
use creep_detector::{detect_creeps, DetectConfig, DistanceUnit, Observation};

fn main() {
    let start = NaiveDateTime::parse_from_str("2024-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();

    // A drive north out of London, one scan per minute
    let drive: Vec<(f64, f64)> = (0..10)
        .map(|i| (51.5074 + i as f64 * 0.004, -0.1278))
        .collect();

    let mut log = Vec::new();
    for (i, (lat, lng)) in drive.iter().enumerate() {
        let seen = start + Duration::minutes(i as i64);

        // Home access point, only heard at the start
        if i < 2 {
            log.push(sighting("00:11:22:33:44:55", "HomeNet", "WIFI", seen, *lat, *lng));
        }
        // Tracker tag heard on every scan
        log.push(sighting("c0:ff:ee:00:00:01", "", "BLE", seen, *lat, *lng));
        // Phone with no GPS fix on one scan
        let (plat, plng) = if i == 5 { (0.0, 0.0) } else { (*lat, *lng) };
        log.push(sighting("de:ad:be:ef:00:02", "AndroidAP", "WIFI", seen, plat, plng));
    }

    for unit in [DistanceUnit::Miles, DistanceUnit::Kilometers] {
        let config = DetectConfig { threshold: 0.2, unit };
        let creeps = detect_creeps(&log, &config).unwrap();

        println!("Threshold {} {}: {} creeps", config.threshold, unit, creeps.len());
        for creep in &creeps {
            println!(
                "  #{} {} spans {:.2} {} ({} fixed sightings)",
                creep.record.rank,
                creep.device_id(),
                creep.record.extent.distance,
                unit,
                creep.history.len()
            );
        }
        println!();
    }
}

fn sighting(
    mac: &str,
    ssid: &str,
    device_type: &str,
    seen: NaiveDateTime,
    lat: f64,
    lng: f64,
) -> Observation {
    Observation {
        ssid: ssid.to_string(),
        device_type: device_type.to_string(),
        rssi: -70,
        channel: 6,
        ..Observation::new(mac, seen, lat, lng)
    }
}
