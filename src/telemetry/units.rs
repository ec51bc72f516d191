//! Unit normalization for recorded channels
//!
//! Rotation channels are recorded in radians and plotted in degrees.
//! The prismatic channel (meters) and all force channels (newtons) are
//! already SI and pass through untouched.

use ndarray::Array1;

/// Convert a radian series to degrees, elementwise
pub fn to_degrees(radians: &Array1<f64>) -> Array1<f64> {
    radians.mapv(f64::to_degrees)
}
