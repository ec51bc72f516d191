//! PNG rasterization of figure layouts
//!
//! Stands in for an interactive viewer: each figure becomes one PNG in the
//! output directory. Grid cells are split evenly and filled row-major, so
//! panel order follows the sensor site order by construction.

use plotters::prelude::*;
use std::path::{Path, PathBuf};

use super::layout::FigureSpec;
use super::FigureBackend;
use crate::config::FigureDimension;
use crate::telemetry::error::{Result, TelemetryError};

/// Drawing backend writing one PNG per figure
pub struct PlottersBackend {
    out_dir: PathBuf,
    width: FigureDimension,
    height: FigureDimension,
}

impl PlottersBackend {
    pub fn new(out_dir: &Path, width: FigureDimension, height: FigureDimension) -> Self {
        PlottersBackend {
            out_dir: out_dir.to_path_buf(),
            width,
            height,
        }
    }

    /// Pixel size for a figure, derived from its panel grid when Auto
    fn figure_size(&self, figure: &FigureSpec) -> (u32, u32) {
        (
            self.width.resolve(figure.cols()),
            self.height.resolve(figure.rows()),
        )
    }
}

impl FigureBackend for PlottersBackend {
    fn render(&self, figure: &FigureSpec) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| {
            TelemetryError::Render(format!(
                "cannot create output directory {}: {}",
                self.out_dir.display(),
                e
            ))
        })?;

        let path = self.out_dir.join(format!("{}.png", figure.name));
        let (width, height) = self.figure_size(figure);
        draw_figure(figure, &path, width, height)
            .map_err(|e| TelemetryError::Render(format!("figure '{}': {}", figure.name, e)))?;
        Ok(path)
    }
}

fn line_style(color: RGBAColor, width: u32) -> ShapeStyle {
    ShapeStyle {
        color,
        filled: false,
        stroke_width: width,
    }
}

fn draw_figure(
    figure: &FigureSpec,
    path: &Path,
    width: u32,
    height: u32,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&figure.title, ("sans-serif", 24))?;

    let cells = root.split_evenly((figure.rows(), figure.cols()));
    // A single-frame recording has a degenerate [0, 0] span; give the axis
    // some width so the chart stays drawable
    let time_end = match figure.time_end() {
        t if t > 0.0 => t,
        _ => 1.0,
    };

    for (panel, cell) in figure.panels.iter().zip(cells.iter()) {
        let (y_lo, y_hi) = panel.y_range();

        let mut chart = ChartBuilder::on(cell)
            .caption(&panel.title, ("sans-serif", 16))
            .margin(6)
            .x_label_area_size(28)
            .y_label_area_size(48)
            .build_cartesian_2d(0.0..time_end, y_lo..y_hi)?;

        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(line_style(BLACK.mix(0.15), 1))
            .light_line_style(line_style(BLACK.mix(0.05), 1))
            .y_desc(panel.y_label.as_str());
        if let Some(x_label) = &panel.x_label {
            mesh.x_desc(x_label.as_str());
        }
        mesh.draw()?;

        for series in &panel.series {
            let color = RGBColor(series.color[0], series.color[1], series.color[2]);
            let legend_color = color;
            chart
                .draw_series(LineSeries::new(
                    figure
                        .time
                        .iter()
                        .copied()
                        .zip(series.values.iter().copied()),
                    line_style(color.mix(series.alpha), series.width),
                ))?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(
                        vec![(x, y), (x + 18, y)],
                        line_style(legend_color.to_rgba(), 2),
                    )
                });
        }

        if panel.legend && !panel.series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(ShapeStyle {
                    color: WHITE.mix(0.85),
                    filled: true,
                    stroke_width: 1,
                })
                .border_style(line_style(BLACK.mix(0.4), 1))
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}
