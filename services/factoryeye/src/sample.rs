//! Sensor sample model and conversion from the compressor API payload

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One reading as returned by `GET /api/compresseur/data`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub vibration_x: f64,
    #[serde(default)]
    pub vibration_y: f64,
    #[serde(default)]
    pub vibration_z: f64,
}

/// A timestamped sensor reading with its derived vibration mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Option<DateTime<Utc>>,
    pub clock_label: String,
    pub pressure: f64,
    pub current: f64,
    pub vibration_x: f64,
    pub vibration_y: f64,
    pub vibration_z: f64,
    pub vibration_mean: f64,
}

impl Sample {
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        pressure: f64,
        current: f64,
        vibration_x: f64,
        vibration_y: f64,
        vibration_z: f64,
    ) -> Self {
        let clock_label = timestamp.map(|ts| clock_label(&ts)).unwrap_or_default();
        Self {
            timestamp,
            clock_label,
            pressure,
            current,
            vibration_x,
            vibration_y,
            vibration_z,
            vibration_mean: vibration_mean(vibration_x, vibration_y, vibration_z),
        }
    }

    /// Seconds since midnight of the sample's own day, if it has a timestamp
    pub fn seconds_of_day(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.num_seconds_from_midnight())
    }
}

impl From<RawReading> for Sample {
    fn from(raw: RawReading) -> Self {
        let timestamp = raw.timestamp.as_deref().and_then(parse_timestamp);
        Sample::new(
            timestamp,
            raw.pressure,
            raw.current_value,
            raw.vibration_x,
            raw.vibration_y,
            raw.vibration_z,
        )
    }
}

/// Round to two decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of the three vibration axes, rounded to two decimals
pub fn vibration_mean(x: f64, y: f64, z: f64) -> f64 {
    round2((x + y + z) / 3.0)
}

/// Zero-padded `HH:MM:SS` label for a timestamp
pub fn clock_label(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Parse an API timestamp.
///
/// Accepts RFC 3339 as well as zone-less ISO date-times (`2023-01-01T09:00:00`,
/// optionally with fractional seconds or a space separator), which are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Convert API readings into a time-ascending series
pub fn samples_from_readings(readings: Vec<RawReading>) -> Vec<Sample> {
    let mut samples: Vec<Sample> = readings.into_iter().map(Sample::from).collect();
    samples.sort_by_key(|s| s.timestamp);
    samples
}
