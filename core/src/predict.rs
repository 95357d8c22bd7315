//! One-step constant-velocity kinematic prediction
//!
//! For a record at index `i` with local position `p_i`, local-frame velocity
//! `v_i`, and the next record's timestamp `t_{i+1}`, the predicted next
//! position is
//!
//! ```text
//! predicted = p_i + v_i * (t_{i+1} - t_i)
//! ```
//!
//! component-wise on the east/north/up axes. The model assumes constant
//! velocity over the interval and uses no acceleration data. Prediction is
//! expressed as a pure mapping over adjacent record pairs: there is no
//! accumulated state, every pair is independent, and a trace of `N` records
//! yields exactly `N - 1` predictions (the last record has no successor).
//!
//! The merge step guarantees non-decreasing timestamps, so a non-positive
//! interval between adjacent records is a broken invariant rather than a
//! data-quality issue: the whole prediction pass aborts with
//! [`AnalysisError::NonPositiveInterval`] instead of silently producing a
//! meaningless result.

use crate::error::{AnalysisError, AnalysisResult};
use crate::frame::{FrameConverter, LocalPosition};
use crate::merge::MergedTrace;
use crate::records::TelemetryRecord;
use nalgebra::Vector3;

/// One prediction for an adjacent record pair.
///
/// `record_index` is the index of the earlier record of the pair within the
/// merged trace; the prediction targets the record at `record_index + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Index of the record the prediction was made from
    pub record_index: usize,
    /// Predicted position of the next record
    pub predicted: LocalPosition,
    /// Actually reported position of the next record
    pub actual: LocalPosition,
}

impl PredictionResult {
    /// Euclidean distance between prediction and the actually reported next
    /// position, in meters.
    ///
    /// The reported position is treated as ground truth here; see
    /// [`crate::evaluate::ErrorDistribution`] for the documented caveat.
    pub fn error_m(&self) -> f64 {
        self.predicted.distance_to(&self.actual)
    }
}

/// Predicts the next position from the current one under constant velocity.
///
/// Pure function of its inputs; `dt` is assumed positive (trace-level callers
/// validate it, see [`predict_trace`]).
///
/// # Example
/// ```rust
/// use kinetrace::frame::LocalPosition;
/// use kinetrace::predict::predict_next;
/// use nalgebra::Vector3;
///
/// let p = LocalPosition::new(0.0, 0.0, 0.0);
/// let v = Vector3::new(1.0, 0.0, 0.0);
/// let predicted = predict_next(&p, &v, 2.0);
/// assert_eq!(predicted, LocalPosition::new(2.0, 0.0, 0.0));
/// ```
pub fn predict_next(position: &LocalPosition, velocity: &Vector3<f64>, dt: f64) -> LocalPosition {
    LocalPosition::from_vector(&(position.as_vector() + velocity * dt))
}

/// Runs the constant-velocity prediction over every adjacent pair of a trace.
///
/// Record positions are converted into the converter's fixed local frame
/// first; predictions and actuals then live in the same frame and are directly
/// comparable.
///
/// # Arguments
/// * `trace` - The merged, time-ordered trace
/// * `converter` - Frame converter anchored at the trace's reference point
///
/// # Returns
/// One [`PredictionResult`] per adjacent pair (`trace.len() - 1` results), in
/// trace order.
///
/// # Errors
/// * [`AnalysisError::NonPositiveInterval`] if any adjacent pair has
///   `dt <= 0`, which indicates a merge/sort invariant violation.
/// * [`AnalysisError::InvalidCoordinate`] if a record's geodetic position
///   cannot be converted.
pub fn predict_trace(
    trace: &MergedTrace,
    converter: &FrameConverter,
) -> AnalysisResult<Vec<PredictionResult>> {
    let locals = converter.convert_trace(trace)?;
    predict_pairs(trace.records(), &locals)
}

/// Same as [`predict_trace`], for callers that already hold the converted
/// local positions (avoids converting the trace twice). `records` and
/// `locals` must correspond index-wise.
pub fn predict_pairs(
    records: &[TelemetryRecord],
    locals: &[LocalPosition],
) -> AnalysisResult<Vec<PredictionResult>> {
    records
        .windows(2)
        .zip(locals.windows(2))
        .enumerate()
        .map(|(index, (records, positions))| {
            let dt = records[1].timestamp - records[0].timestamp;
            if dt <= 0.0 {
                return Err(AnalysisError::NonPositiveInterval { index, dt });
            }
            Ok(PredictionResult {
                record_index: index,
                predicted: predict_next(&positions[0], &records[0].velocity(), dt),
                actual: positions[1],
            })
        })
        .collect()
}
