//! End-to-end pipeline orchestration
//!
//! [`run_analysis`] wires the stages together in their fixed left-to-right
//! order: merge the two streams, fix the local frame at the first record,
//! convert every geodetic position, predict each next position under constant
//! velocity, and score the errors, with the spectral analysis run
//! independently on the chosen velocity channel of the merged trace. A failed
//! stage aborts the whole run and surfaces its error; only malformed input
//! rows are recovered (dropped and counted) inside the merge stage.
//!
//! The resulting [`AnalysisReport`] is the in-memory contract handed to
//! external visualization or reporting collaborators; `to_csv`-style exports
//! are provided for the prediction results and the spectrum.

use crate::error::AnalysisResult;
use crate::evaluate::ErrorDistribution;
use crate::frame::{FrameConverter, LocalPosition};
use crate::merge::{MergeReport, MergedTrace, RecordMerger};
use crate::predict::{PredictionResult, predict_pairs};
use crate::records::{RawRecord, RecordUnits, VelocityChannel};
use crate::spectrum::{DEFAULT_UNIFORMITY_TOLERANCE, SpectralAnalyzer, Spectrum};
use chrono::{DateTime, Utc};
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Configuration for one analysis run.
///
/// Replaces what used to be ambient global state (reference point, unit
/// factors) with explicit values handed to the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Scale factors from raw log units into seconds/meters
    pub units: RecordUnits,
    /// Velocity channel handed to the spectral analyzer
    pub channel: VelocityChannel,
    /// Relative tolerance on sampling-interval spread for the spectrum
    pub spectral_tolerance: f64,
    /// Optional wall-clock session start, enabling wall-time mapping on the
    /// merged trace
    pub session_epoch: Option<DateTime<Utc>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            units: RecordUnits::default(),
            channel: VelocityChannel::East,
            spectral_tolerance: DEFAULT_UNIFORMITY_TOLERANCE,
            session_epoch: None,
        }
    }
}

/// Everything one analysis run produces, read-only once built.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// The merged, time-ordered trace
    pub trace: MergedTrace,
    /// Dropped-row accounting from the merge stage
    pub merge_report: MergeReport,
    /// Local ENU position of every trace record, index-aligned
    pub locals: Vec<LocalPosition>,
    /// One constant-velocity prediction per adjacent record pair
    pub predictions: Vec<PredictionResult>,
    /// The full prediction-error distance distribution
    pub errors: ErrorDistribution,
    /// Magnitude spectrum of the configured velocity channel
    pub spectrum: Spectrum,
}

impl AnalysisReport {
    /// Writes the prediction results to a CSV file.
    ///
    /// Columns: pair index, the interval's start and end times, the predicted
    /// and actual positions (named east/north/up columns), and the error
    /// distance in meters.
    pub fn predictions_to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(
            file,
            "record_index,t_from_s,t_to_s,predicted_east_m,predicted_north_m,predicted_up_m,actual_east_m,actual_north_m,actual_up_m,error_m"
        )?;
        let records = self.trace.records();
        for result in &self.predictions {
            writeln!(
                file,
                "{},{:.6},{:.6},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
                result.record_index,
                records[result.record_index].timestamp,
                records[result.record_index + 1].timestamp,
                result.predicted.east,
                result.predicted.north,
                result.predicted.up,
                result.actual.east,
                result.actual.north,
                result.actual.up,
                result.error_m()
            )?;
        }
        Ok(())
    }

    /// Writes the frequency/magnitude pairs of the spectrum to a CSV file.
    pub fn spectrum_to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "frequency_hz,magnitude")?;
        for (frequency, magnitude) in self
            .spectrum
            .frequencies_hz
            .iter()
            .zip(&self.spectrum.magnitudes)
        {
            writeln!(file, "{:.6},{:.6}", frequency, magnitude)?;
        }
        Ok(())
    }
}

/// Runs the full pipeline over two raw record streams.
///
/// # Arguments
/// * `vehicle` - Raw records logged by the vehicle
/// * `ground` - Raw records logged by the ground station
/// * `config` - Unit, channel, and tolerance configuration
///
/// # Errors
/// Structural failures (empty trace, non-positive interval, invalid
/// coordinate, spectral preconditions) abort the run. Malformed rows are
/// dropped and counted in the report instead.
pub fn run_analysis(
    vehicle: &[RawRecord],
    ground: &[RawRecord],
    config: &AnalysisConfig,
) -> AnalysisResult<AnalysisReport> {
    let mut merger = RecordMerger::new(config.units);
    if let Some(epoch) = config.session_epoch {
        merger = merger.with_epoch(epoch);
    }
    let (trace, merge_report) = merger.merge(vehicle, ground)?;
    info!(
        "merged trace: {} records over {:.3} s ({} rows dropped)",
        trace.len(),
        trace.duration(),
        merge_report.dropped_total()
    );

    let converter = FrameConverter::from_trace(&trace)?;
    let locals = converter.convert_trace(&trace)?;
    let predictions = predict_pairs(trace.records(), &locals)?;
    let errors = ErrorDistribution::from_results(&predictions);
    info!(
        "{} predictions, mean error {:.3} m, rms {:.3} m",
        predictions.len(),
        errors.mean(),
        errors.rms()
    );

    let analyzer = SpectralAnalyzer::new(config.spectral_tolerance);
    let spectrum = analyzer.analyze(&trace.timestamps(), &trace.channel(config.channel))?;
    if let Some(peak) = spectrum.dominant_frequency(false) {
        info!(
            "dominant {} velocity frequency: {:.3} Hz (magnitude {:.3})",
            config.channel, peak.frequency_hz, peak.magnitude
        );
    }

    Ok(AnalysisReport {
        trace,
        merge_report,
        locals,
        predictions,
        errors,
        spectrum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// A vehicle stream at 2 Hz and a ground-station stream at the same rate,
    /// offset half an interval, so the merged trace is uniformly sampled at
    /// 4 Hz.
    fn interleaved_session(n_per_stream: usize) -> (Vec<RawRecord>, Vec<RawRecord>) {
        let row = |t_ms: f64| RawRecord {
            boot_time: Some(t_ms),
            latitude: Some(45.0 + t_ms * 1e-9),
            longitude: Some(-75.0),
            altitude: Some(100.0),
            velocity_east: Some(1.0),
            velocity_north: Some(0.0),
            velocity_up: Some(0.0),
        };
        let vehicle = (0..n_per_stream).map(|i| row(i as f64 * 500.0)).collect();
        let ground = (0..n_per_stream)
            .map(|i| row(i as f64 * 500.0 + 250.0))
            .collect();
        (vehicle, ground)
    }

    #[test]
    fn pipeline_produces_n_minus_one_predictions() {
        let (vehicle, ground) = interleaved_session(8);
        let report =
            run_analysis(&vehicle, &ground, &AnalysisConfig::default()).expect("analysis");
        assert_eq!(report.trace.len(), 16);
        assert_eq!(report.predictions.len(), 15);
        assert_eq!(report.errors.len(), 15);
        assert_eq!(report.locals.len(), 16);
        assert_eq!(report.merge_report.dropped_total(), 0);
    }

    #[test]
    fn pipeline_normalizes_time_and_fixes_reference() {
        let (vehicle, ground) = interleaved_session(4);
        let report =
            run_analysis(&vehicle, &ground, &AnalysisConfig::default()).expect("analysis");
        assert_approx_eq!(report.trace.records()[0].timestamp, 0.0);
        // First record is the reference, so its local position is the origin.
        assert_approx_eq!(report.locals[0].east, 0.0, 1e-6);
        assert_approx_eq!(report.locals[0].north, 0.0, 1e-6);
        assert_approx_eq!(report.locals[0].up, 0.0, 1e-6);
    }

    #[test]
    fn pipeline_surfaces_empty_input_as_error() {
        let result = run_analysis(&[], &[], &AnalysisConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn report_exports_are_written() {
        let (vehicle, ground) = interleaved_session(6);
        let report =
            run_analysis(&vehicle, &ground, &AnalysisConfig::default()).expect("analysis");

        let predictions_path = std::env::temp_dir().join("kinetrace_predictions_test.csv");
        let spectrum_path = std::env::temp_dir().join("kinetrace_spectrum_test.csv");
        report
            .predictions_to_csv(&predictions_path)
            .expect("write predictions");
        report.spectrum_to_csv(&spectrum_path).expect("write spectrum");

        let predictions = std::fs::read_to_string(&predictions_path).expect("read predictions");
        // Header plus one line per prediction.
        assert_eq!(predictions.lines().count(), 1 + report.predictions.len());
        assert!(predictions.starts_with("record_index,"));

        let spectrum = std::fs::read_to_string(&spectrum_path).expect("read spectrum");
        assert_eq!(
            spectrum.lines().count(),
            1 + report.spectrum.frequencies_hz.len()
        );

        let _ = std::fs::remove_file(&predictions_path);
        let _ = std::fs::remove_file(&spectrum_path);
    }
}
