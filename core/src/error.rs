//! Common error type for the analysis pipeline
//!
//! Every stage of the pipeline reports failures through [`AnalysisError`]. The
//! propagation policy distinguishes two classes of failure:
//! - Per-record data-quality problems ([`AnalysisError::MalformedRecord`]) are
//!   recovered locally by the merger: the offending row is dropped and counted in
//!   the merge report, never silently discarded.
//! - Structural invariant violations ([`AnalysisError::NonPositiveInterval`],
//!   [`AnalysisError::EmptyTrace`]) abort the whole analysis run, since they
//!   signal an upstream bug rather than bad input data and continuing would
//!   produce meaningless results.

use crate::records::SourceTag;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors produced by the telemetry analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A raw record is missing a required field or carries a non-finite or
    /// out-of-range value. The merger drops such rows and counts them.
    #[error("malformed {stream} record at row {row}: invalid field `{field}`")]
    MalformedRecord {
        /// Which input stream the record came from.
        stream: SourceTag,
        /// Zero-based row index within that stream.
        row: usize,
        /// Name of the offending field.
        field: &'static str,
    },
    /// A geodetic coordinate is outside the valid WGS84 range (latitude beyond
    /// ±90 degrees, or a non-finite component).
    #[error("invalid geodetic coordinate: latitude {latitude} deg, longitude {longitude} deg")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    /// The time delta between two adjacent records of a merged trace is zero or
    /// negative. The merge step guarantees non-decreasing timestamps, so this
    /// indicates a broken trace rather than bad input and aborts the whole
    /// prediction pass.
    #[error("non-positive interval at record pair {index}: dt = {dt} s")]
    NonPositiveInterval { index: usize, dt: f64 },
    /// Merging produced no usable records (empty inputs, or every row dropped).
    #[error("merged trace contains no records")]
    EmptyTrace,
    /// Spectral analysis needs at least two samples.
    #[error("insufficient samples for spectral analysis: got {got}, need at least 2")]
    InsufficientSamples { got: usize },
    /// The sampling interval of the series varies beyond the configured
    /// tolerance; the discrete Fourier transform assumes uniform spacing.
    #[error(
        "non-uniform sampling: relative interval spread {spread:.4} exceeds tolerance {tolerance:.4}"
    )]
    NonUniformSampling { spread: f64, tolerance: f64 },
    /// Underlying I/O failure while reading or writing record files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parse or serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_names_stream_and_field() {
        let err = AnalysisError::MalformedRecord {
            stream: SourceTag::Vehicle,
            row: 3,
            field: "latitude",
        };
        let message = err.to_string();
        assert!(message.contains("vehicle"));
        assert!(message.contains("row 3"));
        assert!(message.contains("latitude"));
    }

    #[test]
    fn non_positive_interval_reports_pair_index() {
        let err = AnalysisError::NonPositiveInterval { index: 7, dt: -0.5 };
        assert!(err.to_string().contains("pair 7"));
    }
}
