//! Telemetry record types, source tagging, unit configuration, and CSV I/O
//!
//! This module provides:
//! - [`RawRecord`]: a flat CSV row as logged, with required fields wrapped in
//!   `Option` so missing values can be detected rather than invented
//! - [`TelemetryRecord`]: a validated, immutable record in the analysis's
//!   working units (seconds, degrees, meters)
//! - [`SourceTag`]: which stream a record came from, attached before merging so
//!   provenance is recoverable after the streams are combined
//! - [`RecordUnits`]: explicit scale factors applied exactly once at merge time
//! - CSV import/export for raw records
//!
//! The working units are seconds for time, degrees for latitude/longitude, and
//! meters (and meters per second) for altitude and velocities. Logs commonly
//! record time as integer milliseconds since boot; [`RecordUnits::default`]
//! assumes that and converts to seconds. All unit conversion happens here so
//! downstream components never re-derive units.

use crate::error::{AnalysisError, AnalysisResult};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which input stream a telemetry record came from.
///
/// Records are tagged before the streams are merged, so the origin of every
/// record in a [`crate::merge::MergedTrace`] remains recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Telemetry reported by the moving vehicle itself.
    Vehicle,
    /// Telemetry reported by the observing ground station.
    GroundStation,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Vehicle => write!(f, "vehicle"),
            SourceTag::GroundStation => write!(f, "ground station"),
        }
    }
}

/// Selector for one velocity axis of the local frame.
///
/// Used to pick the channel handed to the spectral analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityChannel {
    East,
    North,
    Up,
}

impl fmt::Display for VelocityChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityChannel::East => write!(f, "east"),
            VelocityChannel::North => write!(f, "north"),
            VelocityChannel::Up => write!(f, "up"),
        }
    }
}

impl FromStr for VelocityChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "east" => Ok(VelocityChannel::East),
            "north" => Ok(VelocityChannel::North),
            "up" => Ok(VelocityChannel::Up),
            other => Err(format!(
                "unknown velocity channel `{other}` (expected east, north, or up)"
            )),
        }
    }
}

/// Struct representing a single row of logged telemetry as read from a CSV file.
///
/// Fields correspond to columns in the CSV. Required values are wrapped in
/// `Option` so that missing columns or empty cells surface as `None` during
/// deserialization instead of being silently defaulted; validation happens in
/// [`TelemetryRecord::from_raw`]. Raw units are whatever the log recorded
/// (typically milliseconds since boot for `boot_time`) and are converted via
/// [`RecordUnits`] when the record is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Time since system boot, in the log's raw time unit (default: milliseconds)
    pub boot_time: Option<f64>,
    /// WGS84 latitude in degrees
    pub latitude: Option<f64>,
    /// WGS84 longitude in degrees
    pub longitude: Option<f64>,
    /// Altitude in the log's raw linear unit (default: meters)
    pub altitude: Option<f64>,
    /// Eastward velocity in the log's raw linear unit per second
    pub velocity_east: Option<f64>,
    /// Northward velocity in the log's raw linear unit per second
    pub velocity_north: Option<f64>,
    /// Upward velocity in the log's raw linear unit per second
    pub velocity_up: Option<f64>,
}

impl RawRecord {
    /// Reads a CSV file and returns a vector of `RawRecord` structs.
    ///
    /// # Arguments
    /// * `path` - Path to the CSV file to read.
    ///
    /// # Returns
    /// * `Ok(Vec<RawRecord>)` if successful.
    /// * `Err` if the file cannot be read or parsed.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> AnalysisResult<Vec<Self>> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: Self = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Writes a slice of `RawRecord` structs to a CSV file.
    ///
    /// # Arguments
    /// * `records` - Records to write
    /// * `path` - Path where the CSV file will be saved
    pub fn to_csv<P: AsRef<Path>>(records: &[Self], path: P) -> AnalysisResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Scale factors converting raw log units into the analysis's working units.
///
/// This replaces ambient global state with explicit configuration handed to the
/// merger: the factors are applied exactly once, when a [`RawRecord`] is
/// validated into a [`TelemetryRecord`], and never again downstream.
///
/// # Example
/// ```rust
/// use kinetrace::records::RecordUnits;
///
/// // Log records boot time in milliseconds, velocities in centimeters/second:
/// let units = RecordUnits {
///     time_scale: 1e-3,
///     velocity_scale: 0.01,
///     ..RecordUnits::default()
/// };
/// assert_eq!(units.altitude_scale, 1.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecordUnits {
    /// Multiplier turning raw boot time into seconds (default `1e-3`, i.e.
    /// milliseconds to seconds).
    pub time_scale: f64,
    /// Multiplier turning raw velocities into meters per second (default `1.0`).
    pub velocity_scale: f64,
    /// Multiplier turning raw altitude into meters (default `1.0`).
    pub altitude_scale: f64,
}

impl Default for RecordUnits {
    fn default() -> Self {
        RecordUnits {
            time_scale: 1e-3,
            velocity_scale: 1.0,
            altitude_scale: 1.0,
        }
    }
}

impl RecordUnits {
    /// Units for logs that already record seconds and meters.
    pub fn si() -> Self {
        RecordUnits {
            time_scale: 1.0,
            velocity_scale: 1.0,
            altitude_scale: 1.0,
        }
    }
}

/// A validated telemetry record in working units, immutable once constructed.
///
/// The `timestamp` is in seconds. Before merging it is still boot-relative;
/// after merging it is normalized so the earliest record across both streams
/// sits at exactly `t = 0`. Velocities are local-frame components along the
/// named east/north/up axes, in meters per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Which stream this record came from
    pub source: SourceTag,
    /// Time in seconds (boot-relative until merged, then normalized to t = 0)
    pub timestamp: f64,
    /// WGS84 latitude in degrees
    pub latitude: f64,
    /// WGS84 longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Eastward velocity in m/s
    pub velocity_east: f64,
    /// Northward velocity in m/s
    pub velocity_north: f64,
    /// Upward velocity in m/s
    pub velocity_up: f64,
}

/// Pull a required field out of a raw record, rejecting missing and non-finite
/// values.
fn required(
    value: Option<f64>,
    field: &'static str,
    stream: SourceTag,
    row: usize,
) -> AnalysisResult<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AnalysisError::MalformedRecord { stream, row, field }),
    }
}

impl TelemetryRecord {
    /// Validates a raw record and converts it into working units.
    ///
    /// A record is malformed if any required field is missing or non-finite, or
    /// if the latitude is outside ±90 degrees. Malformed records surface as
    /// [`AnalysisError::MalformedRecord`] naming the stream, row, and field; the
    /// merger drops and counts them rather than aborting.
    ///
    /// # Arguments
    /// * `raw` - The raw CSV row
    /// * `source` - Which stream the row came from
    /// * `units` - Scale factors into working units
    /// * `row` - Zero-based row index within the stream, used for reporting
    pub fn from_raw(
        raw: &RawRecord,
        source: SourceTag,
        units: &RecordUnits,
        row: usize,
    ) -> AnalysisResult<Self> {
        let latitude = required(raw.latitude, "latitude", source, row)?;
        if latitude.abs() > 90.0 {
            return Err(AnalysisError::MalformedRecord {
                stream: source,
                row,
                field: "latitude",
            });
        }
        Ok(TelemetryRecord {
            source,
            timestamp: required(raw.boot_time, "boot_time", source, row)? * units.time_scale,
            latitude,
            longitude: required(raw.longitude, "longitude", source, row)?,
            altitude: required(raw.altitude, "altitude", source, row)? * units.altitude_scale,
            velocity_east: required(raw.velocity_east, "velocity_east", source, row)?
                * units.velocity_scale,
            velocity_north: required(raw.velocity_north, "velocity_north", source, row)?
                * units.velocity_scale,
            velocity_up: required(raw.velocity_up, "velocity_up", source, row)?
                * units.velocity_scale,
        })
    }

    /// The local-frame velocity as an east/north/up vector in m/s.
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.velocity_east, self.velocity_north, self.velocity_up)
    }

    /// The velocity component along one named axis, in m/s.
    pub fn velocity_component(&self, channel: VelocityChannel) -> f64 {
        match channel {
            VelocityChannel::East => self.velocity_east,
            VelocityChannel::North => self.velocity_north,
            VelocityChannel::Up => self.velocity_up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn raw(boot_time_ms: f64) -> RawRecord {
        RawRecord {
            boot_time: Some(boot_time_ms),
            latitude: Some(45.0),
            longitude: Some(-75.0),
            altitude: Some(120.0),
            velocity_east: Some(1.5),
            velocity_north: Some(-0.5),
            velocity_up: Some(0.1),
        }
    }

    #[test]
    fn from_raw_converts_time_units() {
        let record =
            TelemetryRecord::from_raw(&raw(2500.0), SourceTag::Vehicle, &RecordUnits::default(), 0)
                .expect("valid record");
        assert_approx_eq!(record.timestamp, 2.5);
        assert_approx_eq!(record.latitude, 45.0);
        assert_approx_eq!(record.velocity_east, 1.5);
        assert_eq!(record.source, SourceTag::Vehicle);
    }

    #[test]
    fn from_raw_applies_velocity_scale() {
        let units = RecordUnits {
            velocity_scale: 0.01,
            ..RecordUnits::default()
        };
        let record = TelemetryRecord::from_raw(&raw(0.0), SourceTag::GroundStation, &units, 0)
            .expect("valid record");
        assert_approx_eq!(record.velocity_east, 0.015);
        assert_approx_eq!(record.velocity_north, -0.005);
    }

    #[test]
    fn from_raw_rejects_missing_field() {
        let mut bad = raw(0.0);
        bad.altitude = None;
        let err = TelemetryRecord::from_raw(&bad, SourceTag::Vehicle, &RecordUnits::default(), 4)
            .expect_err("missing altitude must fail");
        match err {
            AnalysisError::MalformedRecord { row, field, .. } => {
                assert_eq!(row, 4);
                assert_eq!(field, "altitude");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_raw_rejects_non_finite_field() {
        let mut bad = raw(0.0);
        bad.velocity_up = Some(f64::NAN);
        let result =
            TelemetryRecord::from_raw(&bad, SourceTag::Vehicle, &RecordUnits::default(), 0);
        assert!(result.is_err());
    }

    #[test]
    fn from_raw_rejects_out_of_range_latitude() {
        let mut bad = raw(0.0);
        bad.latitude = Some(95.0);
        let err = TelemetryRecord::from_raw(&bad, SourceTag::Vehicle, &RecordUnits::default(), 1)
            .expect_err("latitude beyond 90 degrees must fail");
        match err {
            AnalysisError::MalformedRecord { field, .. } => assert_eq!(field, "latitude"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn velocity_vector_uses_named_axis_order() {
        let record =
            TelemetryRecord::from_raw(&raw(0.0), SourceTag::Vehicle, &RecordUnits::si(), 0)
                .expect("valid record");
        let v = record.velocity();
        assert_approx_eq!(v[0], record.velocity_east);
        assert_approx_eq!(v[1], record.velocity_north);
        assert_approx_eq!(v[2], record.velocity_up);
        assert_approx_eq!(
            record.velocity_component(VelocityChannel::North),
            record.velocity_north
        );
    }

    #[test]
    fn velocity_channel_parses_case_insensitively() {
        assert_eq!(
            "East".parse::<VelocityChannel>().unwrap(),
            VelocityChannel::East
        );
        assert!("sideways".parse::<VelocityChannel>().is_err());
    }

    #[test]
    fn csv_round_trip_preserves_missing_fields() {
        let mut records = vec![raw(100.0), raw(200.0)];
        records[1].velocity_north = None;

        let temp_file = std::env::temp_dir().join("kinetrace_raw_roundtrip.csv");
        RawRecord::to_csv(&records, &temp_file).expect("write CSV");
        let read_back = RawRecord::from_csv(&temp_file).expect("read CSV");
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].boot_time, Some(100.0));
        assert_eq!(read_back[1].velocity_north, None);

        let _ = std::fs::remove_file(&temp_file);
    }

    #[test]
    fn from_csv_errors_on_missing_file() {
        let result = RawRecord::from_csv("nonexistent_kinetrace.csv");
        assert!(result.is_err(), "should error on missing file");
    }
}
