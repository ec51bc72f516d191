//! Figure rendering
//!
//! - `layout`: pure figure/panel/series descriptions emitted by the pipeline
//! - `plotters_backend`: rasterizes a layout to PNG files
//!
//! The `FigureBackend` trait is the seam between the two: the pipeline never
//! talks to a drawing library directly, so layouts stay assertable in tests
//! and a windowed viewer could be injected without touching the pipeline.

pub mod layout;
pub mod plotters_backend;

pub use layout::{FigureSpec, PanelSpec, SeriesSpec};
pub use plotters_backend::PlottersBackend;

use crate::telemetry::error::Result;
use std::path::PathBuf;

/// Injected drawing capability consumed by the pipeline
pub trait FigureBackend {
    /// Render one figure, returning the path it landed at
    fn render(&self, figure: &FigureSpec) -> Result<PathBuf>;
}
