//! Offline telemetry trace analysis for vehicle / ground-station sessions
//!
//! This crate ingests timestamped telemetry recorded by a moving vehicle and by a
//! ground station observing it, merges the two streams into a single time-ordered
//! trace, converts the geodetic positions into a local East-North-Up (ENU)
//! tangent-plane frame, predicts each next position with a constant-velocity
//! kinematic model, and scores the prediction error against the next actually
//! reported position. A velocity channel of the merged trace can additionally be
//! pushed through a discrete Fourier transform to find dominant oscillation
//! frequencies.
//!
//! The analysis is a strictly offline, single-pass batch computation over a finite
//! recorded session. There is no motion model beyond constant velocity, no sensor
//! fusion, and no real-time operation: the crate is meant for post-flight analysis
//! of logged sessions, not for running on the vehicle.
//!
//! This crate is primarily built off of three additional dependencies:
//! - [`nav-types`](https://crates.io/crates/nav-types): Provides the WGS84
//!   ellipsoidal coordinate types and the geodetic-to-ENU conversion.
//! - [`nalgebra`](https://crates.io/crates/nalgebra): Provides the vector algebra
//!   for positions and velocities in the local frame.
//! - [`rustfft`](https://crates.io/crates/rustfft): Provides the discrete Fourier
//!   transform used for the velocity spectra.
//!
//! ## Crate overview
//!
//! This crate is organized into several modules following the order of the
//! processing pipeline:
//! - [records]: Raw and validated telemetry record types, source tagging, unit
//!   configuration, and CSV I/O.
//! - [merge]: Combines the two labeled record streams into one time-ordered
//!   [`merge::MergedTrace`] with timestamps normalized to start at zero.
//! - [frame]: Converts geodetic coordinates into the local ENU frame relative to
//!   a reference point fixed once per trace.
//! - [predict]: One-step constant-velocity position prediction per adjacent
//!   record pair.
//! - [evaluate]: Euclidean prediction-error distances and their distribution.
//! - [spectrum]: Magnitude spectrum and dominant frequency of a velocity channel.
//! - [analysis]: End-to-end pipeline orchestration and CSV export of results.
//! - [error]: The common [`error::AnalysisError`] type used across all stages.
//!
//! Data flows strictly left to right: merge → frame conversion → prediction →
//! error evaluation, with the spectral analysis operating independently on the
//! merged trace's velocity channel. Each stage consumes an immutable input and
//! returns a new immutable structure; per-record conversions and per-pair
//! predictions carry no hidden state.
//!
//! ## Units and conventions
//!
//! The working units are seconds, degrees (latitude/longitude), and meters. Raw
//! logs that record time as milliseconds since boot, or velocities in other
//! linear units, are converted exactly once at merge time via an explicit
//! [`records::RecordUnits`] configuration; downstream components never re-derive
//! units. Local positions always use the named fields `east`, `north`, `up`
//! rather than positional tuples, so axis ordering is unambiguous at every API
//! boundary.

pub mod analysis;
pub mod error;
pub mod evaluate;
pub mod frame;
pub mod merge;
pub mod predict;
pub mod records;
pub mod spectrum;

// --- Miscellaneous functions for wrapping angles ---
/// Wrap an angle to the range -180 to 180 degrees
///
/// This function is generic and can be used with any type that implements the necessary traits.
/// It is used to normalize longitudes before geodetic conversion.
///
/// # Arguments
/// * `angle` - The angle to be wrapped, which can be of any type that implements the necessary traits.
/// # Returns
/// * The wrapped angle, which will be in the range -180 to 180 degrees.
/// # Example
/// ```rust
/// use kinetrace::wrap_to_180;
/// let angle = 190.0;
/// let wrapped_angle = wrap_to_180(angle);
/// assert_eq!(wrapped_angle, -170.0); // 190 degrees wrapped to -170 degrees
/// ```
pub fn wrap_to_180<T>(angle: T) -> T
where
    T: PartialOrd + Copy + std::ops::SubAssign + std::ops::AddAssign + From<f64>,
{
    let mut wrapped: T = angle;
    while wrapped > T::from(180.0) {
        wrapped -= T::from(360.0);
    }
    while wrapped < T::from(-180.0) {
        wrapped += T::from(360.0);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_wrap_to_180() {
        assert_eq!(super::wrap_to_180(190.0), -170.0);
        assert_eq!(super::wrap_to_180(-190.0), 170.0);
        assert_eq!(super::wrap_to_180(0.0), 0.0);
        assert_eq!(super::wrap_to_180(180.0), 180.0);
        assert_eq!(super::wrap_to_180(-180.0), -180.0);
    }
}
