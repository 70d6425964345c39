//! WiGLE CSV log loading.
//!
//! A WiGLE export starts with a pre-header line describing the app and device
//! (`WigleWifi-1.4,appRelease=...`), followed by the column header and one row per
//! sighting. Exports are Latin-1 encoded and usually gzip-compressed (`.csv.gz`).
//!
//! Only the columns the detector uses are read:
//!
//! | Column | Field |
//! |--------|-------|
//! | `MAC` | [`Observation::device_id`] |
//! | `SSID` | [`Observation::ssid`] |
//! | `FirstSeen` | [`Observation::first_seen`] (`YYYY-MM-DD HH:MM:SS`) |
//! | `Channel` | [`Observation::channel`] |
//! | `RSSI` | [`Observation::rssi`] |
//! | `CurrentLatitude` | [`Observation::latitude`] |
//! | `CurrentLongitude` | [`Observation::longitude`] |
//! | `Type` | [`Observation::device_type`] |

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use flate2::read::GzDecoder;
use log::{debug, info};

use crate::{Error, Observation, Result};

/// Prefix of the metadata line WiGLE writes before the column header.
pub const PRE_HEADER_PREFIX: &str = "WigleWifi";

/// Timestamp format of the `FirstSeen` column.
pub const FIRST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load a WiGLE log from disk. Paths ending in `.gz` are decompressed.
pub fn load_observations(path: impl AsRef<Path>) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);

    let observations = if is_gzip(path) {
        read_observations(GzDecoder::new(file))?
    } else {
        read_observations(file)?
    };

    info!("Loaded {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Read a decompressed WiGLE log.
pub fn read_observations<R: Read>(mut reader: R) -> Result<Vec<Observation>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_observations(&decode_latin1(&bytes))
}

/// Parse WiGLE CSV text. The pre-header line is optional.
pub fn parse_observations(text: &str) -> Result<Vec<Observation>> {
    let (body, line_offset) = match text {
        t if t.starts_with(PRE_HEADER_PREFIX) => match t.split_once('\n') {
            Some((pre_header, rest)) => {
                debug!("Skipping WiGLE pre-header: {}", pre_header.trim_end());
                (rest, 1)
            }
            None => ("", 1),
        },
        t => (t, 0),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let header_line = line_offset + 1;
    let columns = ColumnIndex::from_headers(reader.headers()?, header_line)?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line()) + line_offset;
        observations.push(columns.observation(&record, line)?);
    }

    debug!("Parsed {} WiGLE rows", observations.len());
    Ok(observations)
}

/// Every byte maps to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Positions of the used columns within a row.
struct ColumnIndex {
    mac: usize,
    ssid: usize,
    first_seen: usize,
    channel: usize,
    rssi: usize,
    latitude: usize,
    longitude: usize,
    device_type: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord, line: u64) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::log(line, format!("missing column {name}")))
        };

        Ok(Self {
            mac: find("MAC")?,
            ssid: find("SSID")?,
            first_seen: find("FirstSeen")?,
            channel: find("Channel")?,
            rssi: find("RSSI")?,
            latitude: find("CurrentLatitude")?,
            longitude: find("CurrentLongitude")?,
            device_type: find("Type")?,
        })
    }

    fn observation(&self, record: &StringRecord, line: u64) -> Result<Observation> {
        let field = |index: usize| record.get(index).unwrap_or("").trim();
        let required = |index: usize, name: &str| {
            let value = field(index);
            if value.is_empty() {
                Err(Error::log(line, format!("empty {name}")))
            } else {
                Ok(value)
            }
        };

        let device_id = required(self.mac, "MAC")?.to_string();

        let first_seen = required(self.first_seen, "FirstSeen")?;
        let first_seen = NaiveDateTime::parse_from_str(first_seen, FIRST_SEEN_FORMAT)
            .map_err(|e| Error::log(line, format!("bad FirstSeen '{first_seen}': {e}")))?;

        let latitude = parse_number::<f64>(required(self.latitude, "CurrentLatitude")?, "CurrentLatitude", line)?;
        let longitude = parse_number::<f64>(required(self.longitude, "CurrentLongitude")?, "CurrentLongitude", line)?;

        // Radio metadata is informational; blank means unknown
        let channel = match field(self.channel) {
            "" => 0,
            value => parse_number(value, "Channel", line)?,
        };
        let rssi = match field(self.rssi) {
            "" => 0,
            value => parse_number(value, "RSSI", line)?,
        };

        Ok(Observation {
            device_id,
            first_seen,
            latitude,
            longitude,
            channel,
            rssi,
            ssid: record.get(self.ssid).unwrap_or("").to_string(),
            device_type: field(self.device_type).to_string(),
        })
    }
}

fn parse_number<T>(value: &str, name: &str, line: u64) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::log(line, format!("bad {name} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const HEADER: &str = "MAC,SSID,AuthMode,FirstSeen,Channel,RSSI,CurrentLatitude,CurrentLongitude,AltitudeMeters,AccuracyMeters,Type";

    fn sample() -> String {
        format!(
            "WigleWifi-1.4,appRelease=2.64,model=Pixel,release=13,device=pixel,display=x,board=x,brand=google\n\
             {HEADER}\n\
             aa:bb:cc:dd:ee:01,HomeNet,[WPA2-PSK-CCMP][ESS],2024-01-01 10:00:00,6,-70,40.0,-75.0,12.0,5.0,WIFI\n\
             aa:bb:cc:dd:ee:02,,[ESS],2024-01-01 10:00:05,11,-85,40.001,-75.001,12.0,5.0,WIFI\n\
             11:22:33:44:55:66,,Misc [LE],2024-01-01 10:01:00,,-60,0.0,0.0,0.0,0.0,BLE\n"
        )
    }

    #[test]
    fn test_parse_with_pre_header() {
        let observations = parse_observations(&sample()).unwrap();

        assert_eq!(observations.len(), 3);
        let first = &observations[0];
        assert_eq!(first.device_id, "aa:bb:cc:dd:ee:01");
        assert_eq!(first.ssid, "HomeNet");
        assert_eq!(first.channel, 6);
        assert_eq!(first.rssi, -70);
        assert_eq!(first.latitude, 40.0);
        assert_eq!(first.longitude, -75.0);
        assert_eq!(first.device_type, "WIFI");
        assert_eq!(first.first_seen.to_string(), "2024-01-01 10:00:00");

        // Blank channel on a BLE row
        assert_eq!(observations[2].channel, 0);
        assert_eq!(observations[2].device_type, "BLE");
    }

    #[test]
    fn test_parse_without_pre_header() {
        let text = format!("{HEADER}\naa:bb:cc:dd:ee:01,Net,[ESS],2024-01-01 10:00:00,1,-50,1.5,2.5,0,0,WIFI\n");
        let observations = parse_observations(&text).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].latitude, 1.5);
    }

    #[test]
    fn test_latin1_ssid() {
        let mut bytes = format!("{HEADER}\n").into_bytes();
        bytes.extend_from_slice(b"aa:bb:cc:dd:ee:01,Caf\xe9,[ESS],2024-01-01 10:00:00,1,-50,1.5,2.5,0,0,WIFI\n");

        let observations = read_observations(bytes.as_slice()).unwrap();
        assert_eq!(observations[0].ssid, "Café");
    }

    #[test]
    fn test_missing_latitude_is_an_error() {
        let text = format!(
            "WigleWifi-1.4,appRelease=2.64\n{HEADER}\n\
             aa:bb:cc:dd:ee:01,Net,[ESS],2024-01-01 10:00:00,1,-50,1.5,2.5,0,0,WIFI\n\
             aa:bb:cc:dd:ee:02,Net,[ESS],2024-01-01 10:00:00,1,-50,,2.5,0,0,WIFI\n"
        );
        match parse_observations(&text) {
            Err(Error::Log { line, message }) => {
                assert_eq!(line, 4);
                assert!(message.contains("CurrentLatitude"));
            }
            other => panic!("expected log error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let text = format!("{HEADER}\naa:bb:cc:dd:ee:01,Net,[ESS],yesterday,1,-50,1.5,2.5,0,0,WIFI\n");
        assert!(matches!(parse_observations(&text), Err(Error::Log { line: 2, .. })));
    }

    #[test]
    fn test_missing_column() {
        let text = "MAC,SSID,FirstSeen\naa,b,2024-01-01 10:00:00\n";
        match parse_observations(text) {
            Err(Error::Log { line: 1, message }) => assert!(message.contains("Channel")),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_load_gzip_and_plain() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("drive.csv");
        std::fs::write(&plain, sample()).unwrap();

        let gz = dir.path().join("drive.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(sample().as_bytes()).unwrap();
        encoder.finish().unwrap();

        let from_plain = load_observations(&plain).unwrap();
        let from_gz = load_observations(&gz).unwrap();
        assert_eq!(from_plain.len(), 3);
        assert_eq!(from_plain, from_gz);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_observations("/nonexistent/drive.csv"),
            Err(Error::Io(_))
        ));
    }
}
