//! Shared figure generation pipeline
//!
//! Orchestrates one recording end to end: load the archive, normalize and
//! derive series, describe figures, hand them to the drawing backend. The
//! same path serves the binary and the tests; everything below this layer
//! returns typed errors instead of printing, and this module (with `main`)
//! is the only place diagnostics are printed.
//!
//! The pipeline:
//! 1. Load the archive and the required kinematic channels
//! 2. Normalize rotations to degrees, pick up optional force channels
//! 3. Describe figures as backend-agnostic layouts
//! 4. Render each figure through the injected backend

use std::path::PathBuf;

use ndarray::Array1;

use crate::config::PipelineConfig;
use crate::render::layout::{FigureSpec, PanelSpec, SeriesSpec};
use crate::render::FigureBackend;
use crate::telemetry::archive::{Archive, SINGLE_CHANNEL};
use crate::telemetry::error::{Result, TelemetryError};
use crate::telemetry::forces::{self, ForceFrame, ForceSeries};
use crate::telemetry::palettes;
use crate::telemetry::sensors::SENSOR_GRID_COLS;
use crate::telemetry::timeline;
use crate::telemetry::units;

/// Optional skin-frame force channel
pub const SKIN_FORCES: &str = "skin_forces";

/// Optional knee-frame force channel
pub const KNEE_FORCES: &str = "skin_forces_knee";

/// Fixed y bounds for the prismatic panel in the full recording, meters
const PRISMATIC_BOUNDS: (f64, f64) = (-0.06, 0.01);

const TIME_LABEL: &str = "Time (seconds)";

/// All series derived from one archive
pub struct Recording {
    pub frames: usize,
    /// Prismatic joint position, meters
    pub prismatic: Array1<f64>,
    /// Rotations in degrees; absent only for the minimal single-channel
    /// capture
    pub rotations: Option<[Array1<f64>; 3]>,
    /// Skin-frame per-sensor forces
    pub skin_forces: Option<ForceSeries>,
    /// Knee-frame per-sensor forces
    pub knee_forces: Option<ForceSeries>,
    /// Diagnostics for optional channels that were absent; printed by the
    /// caller, never by this layer's components
    pub warnings: Vec<String>,
}

/// Load a recording and derive its normalized series
///
/// Missing required kinematic channels are fatal; missing optional force
/// channels degrade to `None` plus a warning entry.
pub fn load_recording(config: &PipelineConfig) -> Result<Recording> {
    let archive = Archive::open(&config.archive_path)?;

    let prismatic = archive.kinematic(SINGLE_CHANNEL)?;
    let frames = prismatic.len();
    if frames == 0 {
        return Err(TelemetryError::InvalidInput(
            "recording has 0 frames".to_string(),
        ));
    }

    // A bare .npy capture holds the prismatic trace alone; every named
    // archive must carry the full kinematic set.
    let rotations = if archive.is_single_array() {
        None
    } else {
        let rotx = load_rotation(&archive, "rotx", frames)?;
        let roty = load_rotation(&archive, "roty", frames)?;
        let rotz = load_rotation(&archive, "rotz", frames)?;
        Some([rotx, roty, rotz])
    };

    let mut warnings = Vec::new();
    let skin_forces = load_force_series(&archive, SKIN_FORCES, ForceFrame::Skin, frames, &mut warnings)?;
    let knee_forces = load_force_series(&archive, KNEE_FORCES, ForceFrame::Knee, frames, &mut warnings)?;

    Ok(Recording {
        frames,
        prismatic,
        rotations,
        skin_forces,
        knee_forces,
        warnings,
    })
}

/// Load one rotation channel and convert it to degrees
fn load_rotation(archive: &Archive, name: &str, frames: usize) -> Result<Array1<f64>> {
    let radians = archive.kinematic(name)?;
    if radians.len() != frames {
        return Err(TelemetryError::InvalidInput(format!(
            "channel '{}' has {} frames, expected {}",
            name,
            radians.len(),
            frames
        )));
    }
    Ok(units::to_degrees(&radians))
}

/// Load an optional force channel, degrading to None with a warning
fn load_force_series(
    archive: &Archive,
    name: &str,
    frame: ForceFrame,
    frames: usize,
    warnings: &mut Vec<String>,
) -> Result<Option<ForceSeries>> {
    if !archive.has(name) {
        warnings.push(format!(
            "optional channel '{}' missing, skipping its figure",
            name
        ));
        return Ok(None);
    }

    let series = ForceSeries::new(frame, archive.forces(name)?);
    if series.frames() != frames {
        return Err(TelemetryError::InvalidInput(format!(
            "channel '{}' has {} frames, expected {}",
            name,
            series.frames(),
            frames
        )));
    }
    Ok(Some(series))
}

/// Describe every figure this recording supports
///
/// One kinematics figure always; one skin-frame per-sensor figure and one
/// knee-frame net-force figure when the recording carries those channels.
pub fn build_figures(recording: &Recording, config: &PipelineConfig) -> Result<Vec<FigureSpec>> {
    let time = timeline::time_axis(recording.frames, config.dt)?.to_vec();

    let mut figures = vec![kinematics_figure(recording, config, &time)];
    if let Some(series) = &recording.skin_forces {
        figures.push(skin_forces_figure(series, config, &time));
    }
    if let Some(series) = &recording.knee_forces {
        figures.push(net_force_figure(series, config, &time));
    }
    Ok(figures)
}

fn kinematics_figure(recording: &Recording, config: &PipelineConfig, time: &[f64]) -> FigureSpec {
    let color = |i| palettes::series_color(palettes::KINEMATICS_PALETTE, i);
    let has_rotations = recording.rotations.is_some();

    let mut panels = vec![PanelSpec {
        title: "Prismatic Joint Position".to_string(),
        x_label: (!has_rotations).then(|| TIME_LABEL.to_string()),
        y_label: "Position (meters)".to_string(),
        // The minimal capture has no calibrated range to pin the axis to
        y_bounds: has_rotations.then_some(PRISMATIC_BOUNDS),
        legend: true,
        series: vec![SeriesSpec {
            label: "Prismatic Ext.".to_string(),
            color: color(0),
            width: config.stroke_width,
            alpha: 1.0,
            values: recording.prismatic.to_vec(),
        }],
    }];

    if let Some(rotations) = &recording.rotations {
        let labels = ["Rot X", "Rot Y", "Rot Z"];
        let series = rotations
            .iter()
            .zip(labels)
            .enumerate()
            .map(|(i, (values, label))| SeriesSpec {
                label: label.to_string(),
                color: color(i + 1),
                width: config.stroke_width.saturating_sub(1).max(1),
                alpha: 0.8,
                values: values.to_vec(),
            })
            .collect();

        panels.push(PanelSpec {
            title: "Joint Rotations (XYZ)".to_string(),
            x_label: Some(TIME_LABEL.to_string()),
            y_label: "Rotation (degrees)".to_string(),
            y_bounds: None,
            legend: true,
            series,
        });
    }

    FigureSpec {
        name: "kinematics".to_string(),
        title: format!("Joint Kinematics ({} steps)", recording.frames),
        grid: (panels.len(), 1),
        time: time.to_vec(),
        panels,
    }
}

fn skin_forces_figure(series: &ForceSeries, config: &PipelineConfig, time: &[f64]) -> FigureSpec {
    let decomposed = forces::decompose(&series.values, &config.sensor_names);
    let color = |i| palettes::series_color(palettes::FORCE_PAIR_PALETTE, i);

    let cols = SENSOR_GRID_COLS;
    let rows = decomposed.len().max(1).div_ceil(cols);

    let panels = decomposed
        .iter()
        .enumerate()
        .map(|(idx, sensor)| {
            let bottom_row = idx / cols == rows - 1;
            PanelSpec {
                title: sensor.site.clone(),
                x_label: bottom_row.then(|| TIME_LABEL.to_string()),
                y_label: "Force (N)".to_string(),
                y_bounds: None,
                // One legend for the whole grid, on the first cell
                legend: idx == 0,
                series: vec![
                    SeriesSpec {
                        label: "Normal".to_string(),
                        color: color(0),
                        width: config.stroke_width,
                        alpha: 1.0,
                        values: sensor.normal.to_vec(),
                    },
                    SeriesSpec {
                        label: "Shear".to_string(),
                        color: color(1),
                        width: config.stroke_width,
                        alpha: 0.9,
                        values: sensor.shear.to_vec(),
                    },
                ],
            }
        })
        .collect();

    FigureSpec {
        name: "skin_forces".to_string(),
        title: format!("Skin Contact Forces ({})", series.frame),
        grid: (rows, cols),
        time: time.to_vec(),
        panels,
    }
}

fn net_force_figure(series: &ForceSeries, config: &PipelineConfig, time: &[f64]) -> FigureSpec {
    let net = forces::net(&series.values);
    let color = |i| palettes::series_color(palettes::NET_FORCE_PALETTE, i);

    let component_labels = ["Net Fx", "Net Fy", "Net Fz"];
    let components = (0..3)
        .map(|axis| SeriesSpec {
            label: component_labels[axis].to_string(),
            color: color(axis),
            width: config.stroke_width.saturating_sub(1).max(1),
            alpha: 0.8,
            values: net.vector.column(axis).to_vec(),
        })
        .collect();

    let panels = vec![
        PanelSpec {
            title: "Net Force Components".to_string(),
            x_label: None,
            y_label: "Force (N)".to_string(),
            y_bounds: None,
            legend: true,
            series: components,
        },
        PanelSpec {
            title: "Net Force Magnitude".to_string(),
            x_label: Some(TIME_LABEL.to_string()),
            y_label: "Force (N)".to_string(),
            y_bounds: None,
            legend: true,
            series: vec![SeriesSpec {
                label: "|F|".to_string(),
                color: color(3),
                width: config.stroke_width,
                alpha: 1.0,
                values: net.magnitude.to_vec(),
            }],
        },
    ];

    FigureSpec {
        name: "net_force".to_string(),
        title: format!("Net Contact Force ({})", series.frame),
        grid: (2, 1),
        time: time.to_vec(),
        panels,
    }
}

/// Process one recording end to end, printing step diagnostics
pub fn run(config: &PipelineConfig, backend: &dyn FigureBackend) -> Result<Vec<PathBuf>> {
    println!("[1/4] Loading {}...", config.archive_path.display());
    let recording = load_recording(config)?;
    println!("✓ Loaded {} frames", recording.frames);
    for warning in &recording.warnings {
        println!("⚠ {}", warning);
    }

    println!("\n[2/4] Deriving series (dt = {:.5} s)...", config.dt);
    if let Some(series) = &recording.knee_forces {
        let net = forces::net(&series.values);
        if let Some((frame, peak)) = net.peak() {
            println!(
                "  Peak net force: {:.2} N at t = {:.3} s ({} sensors, {})",
                peak,
                frame as f64 * config.dt,
                series.sensors(),
                series.frame
            );
        }
    }
    if let Some(series) = &recording.skin_forces {
        let rendered = series.sensors().min(config.sensor_names.len());
        if rendered < series.sensors() {
            println!(
                "  Recording has {} sensors, rendering the {} named sites",
                series.sensors(),
                rendered
            );
        }
    }

    println!("\n[3/4] Building figures...");
    let figures = build_figures(&recording, config)?;
    let names: Vec<&str> = figures.iter().map(|f| f.name.as_str()).collect();
    println!("  {} figure(s): {}", figures.len(), names.join(", "));

    println!("\n[4/4] Rendering...");
    let mut paths = Vec::new();
    for figure in &figures {
        let path = backend.render(figure)?;
        println!(
            "✓ {} ({} panels) -> {}",
            figure.title,
            figure.panels.len(),
            path.display()
        );
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3, ArrayD};
    use ndarray_npy::{NpzWriter, WriteNpyExt};
    use std::fs::File;
    use std::path::Path;

    fn write_npz(path: &Path, channels: &[(&str, ArrayD<f64>)]) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        for (name, array) in channels {
            npz.add_array(*name, array).unwrap();
        }
        npz.finish().unwrap();
    }

    fn kinematic_channels(frames: usize) -> Vec<(&'static str, ArrayD<f64>)> {
        vec![
            ("prismatic", Array1::linspace(0.0, -0.05, frames).into_dyn()),
            ("rotx", Array1::zeros(frames).into_dyn()),
            (
                "roty",
                Array1::from_elem(frames, std::f64::consts::PI).into_dyn(),
            ),
            ("rotz", Array1::zeros(frames).into_dyn()),
        ]
    }

    fn config_for(path: &Path) -> PipelineConfig {
        PipelineConfig {
            archive_path: path.to_path_buf(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_kinematics_only_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kinematics.npz");
        write_npz(&path, &kinematic_channels(30));

        let recording = load_recording(&config_for(&path)).unwrap();
        // Both optional force channels warn exactly once each
        assert_eq!(recording.warnings.len(), 2);
        assert!(recording.skin_forces.is_none());
        assert!(recording.knee_forces.is_none());

        // Rotations arrive in degrees
        let rotations = recording.rotations.as_ref().unwrap();
        assert!((rotations[1][0] - 180.0).abs() < 1e-9);

        let figures = build_figures(&recording, &config_for(&path)).unwrap();
        assert_eq!(figures.len(), 1);
        assert_eq!(figures[0].name, "kinematics");
        assert_eq!(figures[0].grid, (2, 1));
        assert_eq!(figures[0].panels.len(), 2);
        assert_eq!(figures[0].panels[0].y_bounds, Some((-0.06, 0.01)));
    }

    #[test]
    fn test_full_recording_builds_three_figures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.npz");
        let mut channels = kinematic_channels(12);
        channels.push(("skin_forces", Array3::from_elem((12, 8, 3), 1.0).into_dyn()));
        channels.push((
            "skin_forces_knee",
            Array3::from_elem((12, 8, 3), 0.5).into_dyn(),
        ));
        write_npz(&path, &channels);

        let config = config_for(&path);
        let recording = load_recording(&config).unwrap();
        assert!(recording.warnings.is_empty());

        let figures = build_figures(&recording, &config).unwrap();
        let names: Vec<&str> = figures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["kinematics", "skin_forces", "net_force"]);
    }

    #[test]
    fn test_sensor_truncation_renders_eight_panels() {
        // 10 recorded sensors against 8 named sites: 8 panels, no error
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra_sensors.npz");
        let mut channels = kinematic_channels(6);
        channels.push(("skin_forces", Array3::from_elem((6, 10, 3), 2.0).into_dyn()));
        write_npz(&path, &channels);

        let config = config_for(&path);
        let recording = load_recording(&config).unwrap();
        let figures = build_figures(&recording, &config).unwrap();

        let skin = figures.iter().find(|f| f.name == "skin_forces").unwrap();
        assert_eq!(skin.grid, (4, 2));
        assert_eq!(skin.panels.len(), 8);
        assert_eq!(skin.panels[0].title, "posterior top");

        // Legend only on the first cell of the grid
        let legends: Vec<bool> = skin.panels.iter().map(|p| p.legend).collect();
        assert!(legends[0]);
        assert!(legends[1..].iter().all(|&l| !l));

        // Bottom row carries the time label, the rest do not
        assert!(skin.panels[6].x_label.is_some());
        assert!(skin.panels[7].x_label.is_some());
        assert!(skin.panels[..6].iter().all(|p| p.x_label.is_none()));
    }

    #[test]
    fn test_net_force_cancellation_in_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opposing.npz");
        let mut forces = Array3::zeros((4, 2, 3));
        for frame in 0..4 {
            forces[[frame, 0, 0]] = 1.0;
            forces[[frame, 1, 0]] = -1.0;
        }
        let mut channels = kinematic_channels(4);
        channels.push(("skin_forces_knee", forces.into_dyn()));
        write_npz(&path, &channels);

        let config = config_for(&path);
        let recording = load_recording(&config).unwrap();
        assert_eq!(recording.warnings.len(), 1);

        let figures = build_figures(&recording, &config).unwrap();
        let net = figures.iter().find(|f| f.name == "net_force").unwrap();
        let magnitude = &net.panels[1].series[0];
        assert!(magnitude.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_minimal_npy_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suspension_slide.npy");
        Array1::linspace(0.0, -0.04, 20)
            .write_npy(File::create(&path).unwrap())
            .unwrap();

        let config = config_for(&path);
        let recording = load_recording(&config).unwrap();
        assert!(recording.rotations.is_none());

        let figures = build_figures(&recording, &config).unwrap();
        assert_eq!(figures.len(), 1);
        assert_eq!(figures[0].grid, (1, 1));
        assert_eq!(figures[0].panels.len(), 1);
        // Single-panel figure keeps the time label and fits its own range
        assert!(figures[0].panels[0].x_label.is_some());
        assert_eq!(figures[0].panels[0].y_bounds, None);
    }

    #[test]
    fn test_missing_rotation_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.npz");
        write_npz(
            &path,
            &[
                ("prismatic", Array1::zeros(5).into_dyn()),
                ("rotx", Array1::zeros(5).into_dyn()),
            ],
        );

        let result = load_recording(&config_for(&path));
        assert!(matches!(
            result,
            Err(TelemetryError::MissingChannel(name)) if name == "roty"
        ));
    }

    #[test]
    fn test_single_channel_npz_still_needs_rotations() {
        // The minimal-recording exemption is for bare .npy files only; a
        // named archive without the kinematic set is broken
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prismatic_only.npz");
        write_npz(&path, &[("prismatic", Array1::zeros(5).into_dyn())]);

        let result = load_recording(&config_for(&path));
        assert!(matches!(result, Err(TelemetryError::MissingChannel(_))));
    }

    #[test]
    fn test_mismatched_force_frames_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatch.npz");
        let mut channels = kinematic_channels(6);
        channels.push(("skin_forces", Array3::zeros((5, 8, 3)).into_dyn()));
        write_npz(&path, &channels);

        let result = load_recording(&config_for(&path));
        assert!(matches!(result, Err(TelemetryError::InvalidInput(_))));
    }

    #[test]
    fn test_time_axis_shared_across_figures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.npz");
        let mut channels = kinematic_channels(30);
        channels.push(("skin_forces", Array3::zeros((30, 8, 3)).into_dyn()));
        write_npz(&path, &channels);

        let config = config_for(&path);
        let recording = load_recording(&config).unwrap();
        let figures = build_figures(&recording, &config).unwrap();

        for figure in &figures {
            assert_eq!(figure.time.len(), 30);
            assert_eq!(figure.time[0], 0.0);
            assert!((figure.time[29] - 1.0).abs() < 1e-12);
        }
    }
}
