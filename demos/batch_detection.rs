//! Example of running detection over several logs in parallel.
//!
//! Run with: cargo run --example batch_detection --features parallel

use chrono::{Duration, NaiveDateTime};
use creep_detector::{detect_creeps_many, DetectConfig, Observation};
use std::time::Instant;

fn main() {
    println!("Batch Creep Detection Example\n");

    let start = NaiveDateTime::parse_from_str("2024-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();

    let origins = [
        ("london", 51.5074, -0.1278),
        ("paris", 48.8566, 2.3522),
        ("nyc", 40.7128, -74.0060),
    ];

    let logs: Vec<Vec<Observation>> = origins
        .iter()
        .map(|(_, lat, lng)| synthetic_drive(start, *lat, *lng, 500))
        .collect();

    let timer = Instant::now();
    let results = detect_creeps_many(&logs, &DetectConfig::default());
    println!("Detection completed in {:?}\n", timer.elapsed());

    for ((name, _, _), result) in origins.iter().zip(&results) {
        match result {
            Ok(creeps) => {
                let ids: Vec<&str> = creeps.device_ids().collect();
                println!("  {}: {} creeps {:?}", name, creeps.len(), ids);
            }
            Err(e) => println!("  {}: failed: {}", name, e),
        }
    }
}

/// A drive of `scans` scans heading north-east, with one follower and a
/// rotating set of roadside access points.
fn synthetic_drive(start: NaiveDateTime, lat: f64, lng: f64, scans: usize) -> Vec<Observation> {
    let mut log = Vec::new();
    for i in 0..scans {
        let seen = start + Duration::seconds(i as i64 * 10);
        let (plat, plng) = (lat + i as f64 * 0.0002, lng + i as f64 * 0.0002);

        log.push(Observation::new("f0:11:0e:e5:00:01", seen, plat, plng));
        log.push(Observation::new(format!("ap:{:04}", i / 5), seen, plat, plng));
    }
    log
}
