//! Frequency-domain analysis of a velocity channel
//!
//! The [`SpectralAnalyzer`] takes one ordered numeric series (a velocity
//! channel of the merged trace) sampled over the normalized timestamps and
//! computes its one-sided magnitude spectrum via a discrete Fourier transform
//! ([`rustfft`]). The frequency axis is reported in physically meaningful hertz
//! derived from the mean sampling interval, never as raw bin indices.
//!
//! The transform assumes uniform sampling. Real logs are only near-uniform, so
//! the analyzer measures the relative spread of the sampling intervals and
//! fails with [`AnalysisError::NonUniformSampling`] when it exceeds a
//! configurable tolerance instead of silently producing a spectrum with a
//! distorted frequency axis.
//!
//! Magnitudes are scaled to one-sided amplitudes: a pure sine of amplitude `A`
//! at an on-bin frequency shows up as a peak of magnitude ≈ `A`.

use crate::error::{AnalysisError, AnalysisResult};
use num_complex::Complex;
use rustfft::FftPlanner;

/// Default relative tolerance on sampling-interval spread (10 %).
pub const DEFAULT_UNIFORMITY_TOLERANCE: f64 = 0.1;

/// A dominant (locally maximal) bin of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Center frequency of the bin in Hz
    pub frequency_hz: f64,
    /// One-sided amplitude at that bin
    pub magnitude: f64,
    /// Bin index within the one-sided spectrum
    pub bin: usize,
}

/// One-sided magnitude spectrum of a uniformly sampled series.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Frequency axis in Hz, bin 0 is DC
    pub frequencies_hz: Vec<f64>,
    /// One-sided amplitude per frequency bin
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Width of one frequency bin in Hz.
    pub fn bin_width(&self) -> f64 {
        self.frequencies_hz.get(1).copied().unwrap_or(0.0)
    }

    /// The frequency bin of maximal magnitude.
    ///
    /// The zero-frequency (DC) component is excluded unless `include_dc` is
    /// set: a velocity channel with a nonzero mean would otherwise always
    /// report 0 Hz as dominant. Returns `None` only when no candidate bin
    /// exists.
    pub fn dominant_frequency(&self, include_dc: bool) -> Option<SpectralPeak> {
        let start = if include_dc { 0 } else { 1 };
        self.magnitudes
            .iter()
            .enumerate()
            .skip(start)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, &magnitude)| SpectralPeak {
                frequency_hz: self.frequencies_hz[bin],
                magnitude,
                bin,
            })
    }

    /// All bins whose magnitude exceeds both neighbors, strongest first.
    ///
    /// DC is excluded unless `include_dc` is set; the DC bin counts as a local
    /// maximum when it exceeds bin 1.
    pub fn local_peaks(&self, include_dc: bool) -> Vec<SpectralPeak> {
        let m = &self.magnitudes;
        let mut peaks: Vec<SpectralPeak> = (0..m.len())
            .filter(|&bin| {
                if bin == 0 {
                    include_dc && m.len() > 1 && m[0] > m[1]
                } else {
                    let above_prev = m[bin] > m[bin - 1];
                    let above_next = bin + 1 >= m.len() || m[bin] > m[bin + 1];
                    above_prev && above_next
                }
            })
            .map(|bin| SpectralPeak {
                frequency_hz: self.frequencies_hz[bin],
                magnitude: m[bin],
                bin,
            })
            .collect();
        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        peaks
    }
}

/// Computes magnitude spectra of velocity channels.
///
/// Stateless apart from its configuration: `analyze` is a pure function of the
/// input series and its timestamps.
#[derive(Debug, Clone, Copy)]
pub struct SpectralAnalyzer {
    tolerance: f64,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        SpectralAnalyzer::new(DEFAULT_UNIFORMITY_TOLERANCE)
    }
}

impl SpectralAnalyzer {
    /// Creates an analyzer with the given relative tolerance on the spread of
    /// sampling intervals.
    pub fn new(uniformity_tolerance: f64) -> Self {
        SpectralAnalyzer {
            tolerance: uniformity_tolerance,
        }
    }

    /// Computes the one-sided magnitude spectrum of `samples` taken at
    /// `timestamps` (seconds).
    ///
    /// # Arguments
    /// * `timestamps` - Sample instants in seconds, same length as `samples`
    /// * `samples` - The series to transform (one velocity channel)
    ///
    /// # Errors
    /// * [`AnalysisError::InsufficientSamples`] for fewer than two samples or
    ///   mismatched input lengths.
    /// * [`AnalysisError::NonUniformSampling`] when the relative spread of the
    ///   sampling intervals exceeds the configured tolerance.
    pub fn analyze(&self, timestamps: &[f64], samples: &[f64]) -> AnalysisResult<Spectrum> {
        let n = samples.len();
        if n < 2 || timestamps.len() != n {
            return Err(AnalysisError::InsufficientSamples {
                got: n.min(timestamps.len()),
            });
        }

        let mean_dt = (timestamps[n - 1] - timestamps[0]) / (n - 1) as f64;
        if !(mean_dt > 0.0) {
            return Err(AnalysisError::NonUniformSampling {
                spread: f64::INFINITY,
                tolerance: self.tolerance,
            });
        }
        let spread = timestamps
            .windows(2)
            .map(|pair| ((pair[1] - pair[0]) - mean_dt).abs() / mean_dt)
            .fold(0.0, f64::max);
        if spread > self.tolerance {
            return Err(AnalysisError::NonUniformSampling {
                spread,
                tolerance: self.tolerance,
            });
        }

        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let bins = n / 2 + 1;
        let frequencies_hz = (0..bins)
            .map(|k| k as f64 / (n as f64 * mean_dt))
            .collect();
        // One-sided amplitude scaling: interior bins carry the energy of their
        // mirrored negative-frequency twin.
        let magnitudes = buffer[..bins]
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let scale = if k == 0 || (n % 2 == 0 && k == n / 2) {
                    1.0
                } else {
                    2.0
                };
                scale * c.norm() / n as f64
            })
            .collect();

        Ok(Spectrum {
            frequencies_hz,
            magnitudes,
        })
    }
}
