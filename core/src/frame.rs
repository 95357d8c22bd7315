//! Geodetic to local East-North-Up frame conversion
//!
//! The local-level frame used for prediction and scoring is an East-North-Up
//! (ENU) Cartesian tangent plane anchored at a reference geodetic point. The
//! reference is fixed exactly once per trace, by convention the geodetic
//! coordinate of the first record after merging, and every conversion in that
//! analysis run uses the same reference. There is deliberately no way to move
//! the reference of an existing [`FrameConverter`]: positions converted against
//! different references are not comparable.
//!
//! The ellipsoidal-earth transform itself comes from the
//! [`nav-types`](https://crates.io/crates/nav-types) crate: both points are
//! lifted into WGS84/ECEF and their difference is rotated into the reference
//! point's tangent frame. The result is always exposed through the named
//! `east`/`north`/`up` fields of [`LocalPosition`], never as a positional
//! tuple, so callers cannot mix up axis order.

use crate::error::{AnalysisError, AnalysisResult};
use crate::merge::MergedTrace;
use crate::records::TelemetryRecord;
use crate::wrap_to_180;
use nalgebra::Vector3;
use nav_types::{ENU, WGS84};

/// A position in the local tangent-plane frame, in meters.
///
/// Converting the reference point itself yields `(0, 0, 0)` within
/// floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    /// Eastward offset from the reference point in meters
    pub east: f64,
    /// Northward offset from the reference point in meters
    pub north: f64,
    /// Upward offset from the reference point in meters
    pub up: f64,
}

impl LocalPosition {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        LocalPosition { east, north, up }
    }

    /// The position as an east/north/up vector.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.east, self.north, self.up)
    }

    /// Builds a position from an east/north/up vector.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        LocalPosition::new(v[0], v[1], v[2])
    }

    /// Euclidean distance to another local position, in meters.
    ///
    /// # Example
    /// ```rust
    /// use kinetrace::frame::LocalPosition;
    /// let a = LocalPosition::new(2.0, 0.0, 0.0);
    /// let b = LocalPosition::new(2.0, 1.0, 0.0);
    /// assert_eq!(a.distance_to(&b), 1.0);
    /// ```
    pub fn distance_to(&self, other: &LocalPosition) -> f64 {
        (self.as_vector() - other.as_vector()).norm()
    }
}

/// Converts geodetic coordinates into the local ENU frame of a fixed reference.
///
/// # Example
/// ```rust
/// use kinetrace::frame::FrameConverter;
///
/// let converter = FrameConverter::new(45.0, -75.0, 100.0).unwrap();
/// // The reference point maps to the local origin:
/// let origin = converter.convert(45.0, -75.0, 100.0).unwrap();
/// assert!(origin.east.abs() < 1e-6);
/// assert!(origin.north.abs() < 1e-6);
/// assert!(origin.up.abs() < 1e-6);
/// // A point straight above the reference is purely "up":
/// let above = converter.convert(45.0, -75.0, 150.0).unwrap();
/// assert!((above.up - 50.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FrameConverter {
    reference: WGS84<f64>,
}

impl FrameConverter {
    /// Creates a converter anchored at the given geodetic reference point.
    ///
    /// # Arguments
    /// * `latitude` - Reference latitude in degrees
    /// * `longitude` - Reference longitude in degrees
    /// * `altitude` - Reference altitude in meters
    ///
    /// # Errors
    /// [`AnalysisError::InvalidCoordinate`] if the latitude is outside ±90
    /// degrees or any component is non-finite. Longitudes outside ±180 degrees
    /// are wrapped rather than rejected.
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> AnalysisResult<Self> {
        Ok(FrameConverter {
            reference: validated(latitude, longitude, altitude)?,
        })
    }

    /// Creates a converter anchored at the first record of a merged trace.
    ///
    /// This is the conventional reference choice for a session analysis: fixed
    /// once, applied uniformly to every record of the trace.
    pub fn from_trace(trace: &MergedTrace) -> AnalysisResult<Self> {
        let first = trace.records().first().ok_or(AnalysisError::EmptyTrace)?;
        FrameConverter::new(first.latitude, first.longitude, first.altitude)
    }

    /// The fixed geodetic reference point.
    pub fn reference(&self) -> WGS84<f64> {
        self.reference
    }

    /// Converts a geodetic coordinate into the local ENU frame.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees
    /// * `longitude` - Longitude in degrees
    /// * `altitude` - Altitude in meters
    pub fn convert(&self, latitude: f64, longitude: f64, altitude: f64) -> AnalysisResult<LocalPosition> {
        let point = validated(latitude, longitude, altitude)?;
        // nav-types expresses the difference vector in the tangent frame of the
        // right-hand operand, i.e. relative to the fixed reference.
        let enu: ENU<f64> = point - self.reference;
        Ok(LocalPosition::new(enu.east(), enu.north(), enu.up()))
    }

    /// Converts one telemetry record's geodetic position.
    pub fn to_local(&self, record: &TelemetryRecord) -> AnalysisResult<LocalPosition> {
        self.convert(record.latitude, record.longitude, record.altitude)
    }

    /// Converts every record of a trace against the same fixed reference.
    pub fn convert_trace(&self, trace: &MergedTrace) -> AnalysisResult<Vec<LocalPosition>> {
        trace.records().iter().map(|r| self.to_local(r)).collect()
    }
}

/// Validate a geodetic coordinate and lift it into a WGS84 position.
fn validated(latitude: f64, longitude: f64, altitude: f64) -> AnalysisResult<WGS84<f64>> {
    if !latitude.is_finite()
        || !longitude.is_finite()
        || !altitude.is_finite()
        || latitude.abs() > 90.0
    {
        return Err(AnalysisError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(WGS84::from_degrees_and_meters(
        latitude,
        wrap_to_180(longitude),
        altitude,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn reference_converts_to_origin() {
        let converter = FrameConverter::new(40.0, -75.0, 120.0).expect("valid reference");
        let origin = converter.convert(40.0, -75.0, 120.0).expect("convert");
        assert_approx_eq!(origin.east, 0.0, 1e-6);
        assert_approx_eq!(origin.north, 0.0, 1e-6);
        assert_approx_eq!(origin.up, 0.0, 1e-6);
    }

    #[test]
    fn northward_offset_is_mostly_north() {
        let converter = FrameConverter::new(45.0, 10.0, 0.0).expect("valid reference");
        // One millidegree of latitude is roughly 111 m of northing.
        let local = converter.convert(45.001, 10.0, 0.0).expect("convert");
        assert!(local.north > 100.0 && local.north < 120.0, "north = {}", local.north);
        assert_approx_eq!(local.east, 0.0, 1e-3);
    }

    #[test]
    fn altitude_offset_is_up() {
        let converter = FrameConverter::new(45.0, 10.0, 50.0).expect("valid reference");
        let local = converter.convert(45.0, 10.0, 80.0).expect("convert");
        assert_approx_eq!(local.up, 30.0, 1e-6);
        assert_approx_eq!(local.east, 0.0, 1e-6);
        assert_approx_eq!(local.north, 0.0, 1e-6);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        assert!(matches!(
            FrameConverter::new(90.5, 0.0, 0.0),
            Err(AnalysisError::InvalidCoordinate { .. })
        ));
        let converter = FrameConverter::new(0.0, 0.0, 0.0).expect("valid reference");
        assert!(converter.convert(f64::NAN, 0.0, 0.0).is_err());
        assert!(converter.convert(-91.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn longitude_is_wrapped_not_rejected() {
        let converter = FrameConverter::new(0.0, 180.0, 0.0).expect("valid reference");
        // 190 degrees east is the same meridian as -170 degrees.
        let a = converter.convert(0.0, 190.0, 0.0).expect("wrapped");
        let b = converter.convert(0.0, -170.0, 0.0).expect("canonical");
        assert_approx_eq!(a.east, b.east, 1e-9);
        assert_approx_eq!(a.north, b.north, 1e-9);
    }

    #[test]
    fn from_trace_rejects_empty_inputs() {
        use crate::merge::RecordMerger;
        use crate::records::RecordUnits;
        let merger = RecordMerger::new(RecordUnits::default());
        assert!(merger.merge(&[], &[]).is_err());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = LocalPosition::new(1.0, 2.0, 2.0);
        let b = LocalPosition::new(0.0, 0.0, 0.0);
        assert_approx_eq!(a.distance_to(&b), 3.0);
        assert_approx_eq!(b.distance_to(&a), 3.0);
    }
}
