//! Pipeline configuration
//!
//! The original capture scripts held all of this as ambient module constants
//! (file path, physics step, sensor list). Here it is an explicit value
//! handed to the pipeline entry point, so the pipeline runs against
//! synthetic recordings in tests without touching process-wide state.

use std::path::PathBuf;

use crate::telemetry::sensors;

/// Default recording location
pub const DEFAULT_ARCHIVE: &str = "recording.npz";

/// Default physics step, seconds
pub const DEFAULT_DT: f64 = 1.0 / 30.0;

/// Figure dimension - explicit pixels or derived from the panel grid
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FigureDimension {
    #[default]
    Auto,
    Pixels(u32),
}

impl FigureDimension {
    /// Parse from a CLI value
    ///
    /// Valid formats:
    /// - "auto" or "" (empty) -> Auto
    /// - "900" -> Pixels(900) if in valid range [200, 8000]
    pub fn from_str(value: &str, default: FigureDimension) -> Self {
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return FigureDimension::Auto;
        }

        match trimmed.parse::<u32>() {
            Ok(px) if (200..=8000).contains(&px) => FigureDimension::Pixels(px),
            Ok(px) => {
                eprintln!(
                    "⚠ figure dimension {} out of valid range [200-8000], using default: {:?}",
                    px, default
                );
                default
            }
            Err(_) => {
                eprintln!(
                    "⚠ invalid figure dimension '{}', using default: {:?}",
                    trimmed, default
                );
                default
            }
        }
    }

    /// Resolve to actual pixels from a grid cell count
    ///
    /// For Auto: one base cell plus a fixed increment per extra row/column,
    /// capped so an oversized sensor grid cannot produce an absurd bitmap.
    pub fn resolve(&self, cells: usize) -> u32 {
        match self {
            FigureDimension::Pixels(px) => *px,
            FigureDimension::Auto => {
                const BASE_SIZE: u32 = 800;
                const SIZE_PER_CELL: u32 = 240;
                const MAX_SIZE: u32 = 4000;

                let extra = cells.saturating_sub(1) as u32;
                (BASE_SIZE + extra * SIZE_PER_CELL).min(MAX_SIZE)
            }
        }
    }
}

/// Everything the pipeline needs to process one recording
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Archive location (`.npz`, or `.npy` for the minimal recording)
    pub archive_path: PathBuf,

    /// Physics step between frames, seconds
    pub dt: f64,

    /// Ordered sensor site names; index i labels sensor axis i of every
    /// force series
    pub sensor_names: Vec<String>,

    /// Directory rendered figures land in
    pub out_dir: PathBuf,

    /// Figure width (pixels or Auto from grid columns)
    pub fig_width: FigureDimension,

    /// Figure height (pixels or Auto from grid rows)
    pub fig_height: FigureDimension,

    /// Base line stroke width in pixels
    pub stroke_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            archive_path: PathBuf::from(DEFAULT_ARCHIVE),
            dt: DEFAULT_DT,
            sensor_names: sensors::default_sites(),
            out_dir: PathBuf::from("figures"),
            fig_width: FigureDimension::Auto,
            fig_height: FigureDimension::Auto,
            stroke_width: 2,
        }
    }
}

impl PipelineConfig {
    /// Build a config from defaults plus command-line overrides
    ///
    /// Flags: `--file <path>`, `--dt <seconds>`, `--out <dir>`,
    /// `--width <px|auto>`, `--height <px|auto>`. Unknown flags are ignored.
    /// Invalid values fall back to the default with a warning rather than
    /// aborting the run.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = PipelineConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--file" if i + 1 < args.len() => {
                    config.archive_path = PathBuf::from(&args[i + 1]);
                    i += 2;
                }
                "--dt" if i + 1 < args.len() => {
                    match args[i + 1].parse::<f64>() {
                        Ok(dt) if dt > 0.0 => config.dt = dt,
                        _ => eprintln!(
                            "⚠ invalid --dt '{}', keeping {} s",
                            args[i + 1],
                            config.dt
                        ),
                    }
                    i += 2;
                }
                "--out" if i + 1 < args.len() => {
                    config.out_dir = PathBuf::from(&args[i + 1]);
                    i += 2;
                }
                "--width" if i + 1 < args.len() => {
                    config.fig_width =
                        FigureDimension::from_str(&args[i + 1], FigureDimension::Auto);
                    i += 2;
                }
                "--height" if i + 1 < args.len() => {
                    config.fig_height =
                        FigureDimension::from_str(&args[i + 1], FigureDimension::Auto);
                    i += 2;
                }
                _ => i += 1,
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("prosthetic_plot")
            .chain(list.iter().copied())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.archive_path, PathBuf::from(DEFAULT_ARCHIVE));
        assert_eq!(config.dt, DEFAULT_DT);
        assert_eq!(config.sensor_names.len(), 8);
    }

    #[test]
    fn test_figure_dimension_auto() {
        let dim = FigureDimension::from_str("auto", FigureDimension::Auto);
        assert_eq!(dim, FigureDimension::Auto);
        assert_eq!(dim.resolve(1), 800);
        assert_eq!(dim.resolve(2), 1040);
        assert_eq!(dim.resolve(4), 1520);
        assert_eq!(dim.resolve(100), 4000); // Capped at max
    }

    #[test]
    fn test_figure_dimension_pixels() {
        let dim = FigureDimension::from_str("1500", FigureDimension::Auto);
        assert_eq!(dim, FigureDimension::Pixels(1500));
        assert_eq!(dim.resolve(10), 1500); // Ignores grid size
    }

    #[test]
    fn test_figure_dimension_invalid_falls_back() {
        assert_eq!(
            FigureDimension::from_str("abc", FigureDimension::Auto),
            FigureDimension::Auto
        );
        assert_eq!(
            FigureDimension::from_str("50", FigureDimension::Auto),
            FigureDimension::Auto
        );
        assert_eq!(
            FigureDimension::from_str("90000", FigureDimension::Auto),
            FigureDimension::Auto
        );
    }

    #[test]
    fn test_from_args_overrides() {
        let config = PipelineConfig::from_args(&args(&[
            "--file",
            "session.npz",
            "--dt",
            "0.02",
            "--out",
            "plots",
            "--width",
            "1200",
        ]));
        assert_eq!(config.archive_path, PathBuf::from("session.npz"));
        assert_eq!(config.dt, 0.02);
        assert_eq!(config.out_dir, PathBuf::from("plots"));
        assert_eq!(config.fig_width, FigureDimension::Pixels(1200));
        assert_eq!(config.fig_height, FigureDimension::Auto);
    }

    #[test]
    fn test_from_args_rejects_bad_dt() {
        let config = PipelineConfig::from_args(&args(&["--dt", "-1"]));
        assert_eq!(config.dt, DEFAULT_DT);
    }

    #[test]
    fn test_from_args_ignores_unknown_flags() {
        let config = PipelineConfig::from_args(&args(&["--nonsense", "--file", "a.npz"]));
        assert_eq!(config.archive_path, PathBuf::from("a.npz"));
    }
}
