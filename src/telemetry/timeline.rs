//! Time axis construction
//!
//! A recording carries no timestamps, only a frame count and the fixed
//! physics step. The axis spans [0, frames*dt] inclusive of both endpoints
//! (linspace semantics), not a per-frame increment: the two differ in where
//! the final sample lands.

use ndarray::Array1;

use super::error::{Result, TelemetryError};

/// Build the shared time axis for a recording
///
/// Returns `frames` evenly spaced points from 0 to `frames * dt` inclusive.
pub fn time_axis(frames: usize, dt: f64) -> Result<Array1<f64>> {
    if frames == 0 {
        return Err(TelemetryError::InvalidInput(
            "cannot build a time axis for an empty recording (0 frames)".to_string(),
        ));
    }
    if dt <= 0.0 {
        return Err(TelemetryError::InvalidInput(format!(
            "sample interval must be positive, got {dt}"
        )));
    }
    Ok(Array1::linspace(0.0, frames as f64 * dt, frames))
}
