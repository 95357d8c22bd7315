//! Prediction-error distances and their distribution
//!
//! For every [`PredictionResult`] the evaluator computes the Euclidean norm of
//! `predicted - actual` in the local frame and keeps the full vector of
//! distances, not just a summary statistic, so callers can build histograms,
//! percentiles, or any other derived view. Summary helpers (mean, RMS, max,
//! percentile) are provided on top of the stored vector.
//!
//! Two deliberate properties:
//! - Rescaling into another unit (say centimeters) via [`ErrorDistribution::scaled`]
//!   is a pure scalar multiplication returning a new vector; the stored
//!   distances are never mutated.
//! - No outlier is ever filtered or clipped implicitly. Whatever the upstream
//!   stages produced is what the distribution reflects.
//!
//! Note on ground truth: the reported next position is treated as truth when
//! scoring a prediction, even though reported positions carry their own sensor
//! error. This is a deliberate approximation, not a bug: the distances measure
//! disagreement with the telemetry, not with the (unknown) true trajectory.

use crate::predict::PredictionResult;

/// The full distribution of prediction-error distances, in meters.
///
/// # Example
/// ```rust
/// use kinetrace::frame::LocalPosition;
/// use kinetrace::predict::PredictionResult;
/// use kinetrace::evaluate::ErrorDistribution;
///
/// let result = PredictionResult {
///     record_index: 0,
///     predicted: LocalPosition::new(2.0, 0.0, 0.0),
///     actual: LocalPosition::new(2.0, 1.0, 0.0),
/// };
/// let errors = ErrorDistribution::from_results(&[result]);
/// assert_eq!(errors.values(), &[1.0]);
/// // A pure scaled view, e.g. meters to centimeters:
/// assert_eq!(errors.scaled(100.0), vec![100.0]);
/// assert_eq!(errors.values(), &[1.0]); // stored values untouched
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorDistribution {
    distances: Vec<f64>,
}

impl ErrorDistribution {
    /// Computes the error distance for each prediction result, in trace order.
    ///
    /// `N` records yield `N - 1` results and therefore `N - 1` distances.
    pub fn from_results(results: &[PredictionResult]) -> Self {
        ErrorDistribution {
            distances: results.iter().map(|r| r.error_m()).collect(),
        }
    }

    /// The stored error distances in meters, one per adjacent record pair.
    pub fn values(&self) -> &[f64] {
        &self.distances
    }

    /// A copy of the distances multiplied by `factor` (e.g. `100.0` for
    /// centimeters). Pure: the stored values are not modified.
    pub fn scaled(&self, factor: f64) -> Vec<f64> {
        self.distances.iter().map(|d| d * factor).collect()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Arithmetic mean of the distances; zero for an empty distribution.
    pub fn mean(&self) -> f64 {
        if self.distances.is_empty() {
            return 0.0;
        }
        self.distances.iter().sum::<f64>() / self.distances.len() as f64
    }

    /// Root-mean-square of the distances; zero for an empty distribution.
    pub fn rms(&self) -> f64 {
        if self.distances.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.distances.iter().map(|d| d * d).sum();
        (sum_sq / self.distances.len() as f64).sqrt()
    }

    /// Largest distance; zero for an empty distribution.
    pub fn max(&self) -> f64 {
        self.distances.iter().fold(0.0, |a, &d| a.max(d))
    }

    /// Nearest-rank percentile of the distances, `p` in [0, 100]; zero for an
    /// empty distribution.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.distances.is_empty() {
            return 0.0;
        }
        let mut sorted = self.distances.clone();
        sorted.sort_by(f64::total_cmp);
        let rank = ((p.clamp(0.0, 100.0) / 100.0) * sorted.len() as f64).ceil() as usize;
        sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LocalPosition;
    use assert_approx_eq::assert_approx_eq;

    fn result(index: usize, predicted: LocalPosition, actual: LocalPosition) -> PredictionResult {
        PredictionResult {
            record_index: index,
            predicted,
            actual,
        }
    }

    #[test]
    fn unit_offset_yields_unit_error() {
        let errors = ErrorDistribution::from_results(&[result(
            0,
            LocalPosition::new(2.0, 0.0, 0.0),
            LocalPosition::new(2.0, 1.0, 0.0),
        )]);
        assert_eq!(errors.len(), 1);
        assert_approx_eq!(errors.values()[0], 1.0);
    }

    #[test]
    fn distribution_keeps_every_distance_in_order() {
        let origin = LocalPosition::new(0.0, 0.0, 0.0);
        let results = vec![
            result(0, origin, LocalPosition::new(3.0, 4.0, 0.0)),
            result(1, origin, origin),
            result(2, origin, LocalPosition::new(0.0, 0.0, 2.0)),
        ];
        let errors = ErrorDistribution::from_results(&results);
        assert_eq!(errors.values().len(), 3);
        assert_approx_eq!(errors.values()[0], 5.0);
        assert_approx_eq!(errors.values()[1], 0.0);
        assert_approx_eq!(errors.values()[2], 2.0);
    }

    #[test]
    fn scaled_view_is_pure() {
        let origin = LocalPosition::new(0.0, 0.0, 0.0);
        let errors = ErrorDistribution::from_results(&[result(
            0,
            origin,
            LocalPosition::new(0.5, 0.0, 0.0),
        )]);
        let centimeters = errors.scaled(100.0);
        assert_approx_eq!(centimeters[0], 50.0);
        assert_approx_eq!(errors.values()[0], 0.5, 1e-12);
    }

    #[test]
    fn summary_statistics() {
        let origin = LocalPosition::new(0.0, 0.0, 0.0);
        let results = vec![
            result(0, origin, LocalPosition::new(1.0, 0.0, 0.0)),
            result(1, origin, LocalPosition::new(2.0, 0.0, 0.0)),
            result(2, origin, LocalPosition::new(3.0, 0.0, 0.0)),
            result(3, origin, LocalPosition::new(4.0, 0.0, 0.0)),
        ];
        let errors = ErrorDistribution::from_results(&results);
        assert_approx_eq!(errors.mean(), 2.5);
        assert_approx_eq!(errors.max(), 4.0);
        assert_approx_eq!(errors.rms(), (30.0_f64 / 4.0).sqrt());
        assert_approx_eq!(errors.percentile(50.0), 2.0);
        assert_approx_eq!(errors.percentile(100.0), 4.0);
    }

    #[test]
    fn empty_distribution_is_well_defined() {
        let errors = ErrorDistribution::from_results(&[]);
        assert!(errors.is_empty());
        assert_eq!(errors.mean(), 0.0);
        assert_eq!(errors.rms(), 0.0);
        assert_eq!(errors.max(), 0.0);
        assert_eq!(errors.percentile(95.0), 0.0);
    }
}
