//! # creep-detector
//!
//! Reads a WiGLE wardriving log and lists the devices that were seen over a
//! larger area than the distance threshold, then writes their sightings and the
//! drive track to a GeoJSON file.
//!
//! ## Examples
//!
//! ```text
//! creep-detector WigleWifi_20240301.csv.gz
//! creep-detector drive.csv -d 0.5 -u km -o creeps.geojson
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{info, warn};

use creep_detector::geo_utils::DistanceUnit;
use creep_detector::{detect_creeps, report, wigle, DetectConfig};

#[derive(Parser)]
#[command(name = "creep-detector")]
#[command(version, about = "Find devices that follow you around in a WiGLE log")]
struct Cli {
    /// Input file (WiGLE CSV, normally ends in .csv.gz).
    input: PathBuf,

    /// Output file.  Defaults to the input name with a .geojson extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Distance threshold to be considered a creep.
    #[arg(short, long, default_value_t = 0.2)]
    distance: f64,

    /// Distance unit: km|m|mi|nmi|ft|in|rad|deg.
    #[arg(short, long, default_value = "mi", value_parser = parse_unit)]
    unit: DistanceUnit,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_unit(token: &str) -> Result<DistanceUnit, creep_detector::Error> {
    token.parse()
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> creep_detector::Result<()> {
    let observations = wigle::load_observations(&cli.input)?;

    let config = DetectConfig {
        threshold: cli.distance,
        unit: cli.unit,
    };
    let creeps = detect_creeps(&observations, &config)?;

    for creep in &creeps {
        let extent = &creep.record.extent;
        info!(
            "#{:<3} {}  {:.3} {}  ({} sightings, {} with a fix)",
            creep.record.rank,
            extent.device_id,
            extent.distance,
            extent.unit,
            extent.observation_count,
            creep.history.len()
        );
        if creep.history.is_empty() {
            warn!("{} has no sightings with a position fix", extent.device_id);
        }
    }

    let output = cli
        .output
        .unwrap_or_else(|| report::default_output_path(&cli.input));
    report::write_report(&output, &report::to_geojson(&observations, &creeps))?;

    let shown = output.canonicalize().unwrap_or(output);
    println!("Done! {} creeps found. Report file: {}", creeps.len(), shown.display());
    Ok(())
}
