//! Merging the vehicle and ground-station streams into one time-ordered trace
//!
//! The [`RecordMerger`] takes the two raw record streams, tags each row with its
//! [`SourceTag`], converts raw units into working units exactly once, drops and
//! counts malformed rows, normalizes time so the merged trace starts at
//! `t = 0`, and stable-sorts the combined set ascending by timestamp. The
//! result is a [`MergedTrace`] whose invariants the rest of the pipeline relies
//! on:
//! - timestamps are non-decreasing,
//! - the minimum timestamp is exactly zero,
//! - records with equal timestamps keep their input order (vehicle stream
//!   before ground-station stream), so identical input yields identical output.
//!
//! Dropped rows are never silent: each one is logged at `warn` level and the
//! per-stream counts are surfaced in the [`MergeReport`].

use crate::error::{AnalysisError, AnalysisResult};
use crate::records::{RawRecord, RecordUnits, SourceTag, TelemetryRecord, VelocityChannel};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

/// Per-stream accounting of rows dropped during a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Malformed rows dropped from the vehicle stream
    pub dropped_vehicle: usize,
    /// Malformed rows dropped from the ground-station stream
    pub dropped_ground: usize,
}

impl MergeReport {
    /// Total number of dropped rows across both streams.
    pub fn dropped_total(&self) -> usize {
        self.dropped_vehicle + self.dropped_ground
    }
}

/// A time-ordered sequence of validated telemetry records.
///
/// Built once per analysis run by [`RecordMerger::merge`]; the records are
/// immutable afterwards. Timestamps are seconds, normalized so the earliest
/// record across both input streams sits at exactly `t = 0`.
#[derive(Debug, Clone)]
pub struct MergedTrace {
    records: Vec<TelemetryRecord>,
    epoch: Option<DateTime<Utc>>,
}

impl MergedTrace {
    /// The merged, sorted records.
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Number of records in the trace.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the trace holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Timestamp of the last record, i.e. the session duration in seconds.
    pub fn duration(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.timestamp)
    }

    /// The normalized timestamps of all records, in seconds.
    pub fn timestamps(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// One velocity channel sampled over the trace, in m/s.
    pub fn channel(&self, channel: VelocityChannel) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.velocity_component(channel))
            .collect()
    }

    /// The wall-clock session start this trace is anchored to, if one was
    /// configured on the merger.
    pub fn epoch(&self) -> Option<DateTime<Utc>> {
        self.epoch
    }

    /// Maps the normalized timestamp of record `index` onto the wall clock.
    ///
    /// Boot-relative time does not align with wall time on its own; with a
    /// session epoch configured via [`RecordMerger::with_epoch`], this converts
    /// the normalized seconds back into an absolute UTC instant. Returns `None`
    /// when no epoch is configured or the index is out of range.
    pub fn wall_time(&self, index: usize) -> Option<DateTime<Utc>> {
        let record = self.records.get(index)?;
        let epoch = self.epoch?;
        Some(epoch + Duration::milliseconds((record.timestamp * 1e3).round() as i64))
    }
}

/// Combines two labeled telemetry streams into a [`MergedTrace`].
///
/// The unit configuration is explicit and applied exactly once here; no
/// downstream component re-derives units.
///
/// # Example
/// ```rust
/// use kinetrace::merge::RecordMerger;
/// use kinetrace::records::{RawRecord, RecordUnits};
///
/// let row = |ms: f64| RawRecord {
///     boot_time: Some(ms),
///     latitude: Some(45.0),
///     longitude: Some(-75.0),
///     altitude: Some(100.0),
///     velocity_east: Some(1.0),
///     velocity_north: Some(0.0),
///     velocity_up: Some(0.0),
/// };
/// let merger = RecordMerger::new(RecordUnits::default());
/// let (trace, report) = merger.merge(&[row(1500.0), row(2500.0)], &[row(2000.0)]).unwrap();
/// assert_eq!(trace.len(), 3);
/// assert_eq!(report.dropped_total(), 0);
/// // Earliest record across both streams is normalized to t = 0:
/// assert_eq!(trace.records()[0].timestamp, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RecordMerger {
    units: RecordUnits,
    epoch: Option<DateTime<Utc>>,
}

impl RecordMerger {
    /// Creates a merger with the given unit configuration.
    pub fn new(units: RecordUnits) -> Self {
        RecordMerger { units, epoch: None }
    }

    /// Anchors the merged trace to a wall-clock session start, enabling
    /// [`MergedTrace::wall_time`].
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Merges the vehicle and ground-station streams into one ordered trace.
    ///
    /// Malformed rows are dropped, logged, and counted in the returned
    /// [`MergeReport`]. Fails with [`AnalysisError::EmptyTrace`] if no usable
    /// record remains.
    pub fn merge(
        &self,
        vehicle: &[RawRecord],
        ground: &[RawRecord],
    ) -> AnalysisResult<(MergedTrace, MergeReport)> {
        let mut report = MergeReport::default();
        // Vehicle stream first: the stable sort below preserves this order for
        // records whose normalized timestamps tie.
        let mut records = self.collect_stream(vehicle, SourceTag::Vehicle, &mut report);
        records.extend(self.collect_stream(ground, SourceTag::GroundStation, &mut report));

        if records.is_empty() {
            return Err(AnalysisError::EmptyTrace);
        }

        let t0 = records
            .iter()
            .map(|r| r.timestamp)
            .fold(f64::INFINITY, f64::min);
        for record in &mut records {
            record.timestamp -= t0;
        }
        records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        debug!(
            "merged {} records ({} dropped), span {:.3} s",
            records.len(),
            report.dropped_total(),
            records.last().map_or(0.0, |r| r.timestamp)
        );
        Ok((
            MergedTrace {
                records,
                epoch: self.epoch,
            },
            report,
        ))
    }

    fn collect_stream(
        &self,
        raw: &[RawRecord],
        tag: SourceTag,
        report: &mut MergeReport,
    ) -> Vec<TelemetryRecord> {
        let mut records = Vec::with_capacity(raw.len());
        for (row, record) in raw.iter().enumerate() {
            match TelemetryRecord::from_raw(record, tag, &self.units, row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!("dropping record: {err}");
                    match tag {
                        SourceTag::Vehicle => report.dropped_vehicle += 1,
                        SourceTag::GroundStation => report.dropped_ground += 1,
                    }
                }
            }
        }
        records
    }
}
