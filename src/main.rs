//! Prosthetic telemetry plotter - main entry point
//!
//! Reads a recorded joint/force archive, derives normal/shear and net-force
//! series, and renders synchronized multi-panel time-series figures as PNG
//! files.
//!
//! Module organization:
//! - `telemetry`: archive loading and series math
//! - `render`: figure layouts and the plotters drawing backend
//! - `config`: pipeline configuration
//! - `pipeline`: shared orchestration driven by main and by tests

pub mod config;
pub mod pipeline;
pub mod render;
pub mod telemetry;

use std::time::Instant;

use anyhow::Context;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() {
    println!("Prosthetic Telemetry Plotter v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let config = config::PipelineConfig::from_args(&args);

    println!("Configuration:");
    println!("  Archive: {}", config.archive_path.display());
    println!("  Sample interval: {:.5} s", config.dt);
    println!("  Sensor sites: {}", config.sensor_names.len());
    println!("  Output directory: {}", config.out_dir.display());
    println!();

    let start = Instant::now();
    match process_recording(&config) {
        Ok(count) => {
            println!(
                "\n✓ {} figure(s) rendered in {:.2} s",
                count,
                start.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            // Single line, no stack trace: the chain already names the
            // failed path or channel
            eprintln!("\n✗ {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Drive the pipeline with the production drawing backend
fn process_recording(config: &config::PipelineConfig) -> anyhow::Result<usize> {
    let backend = render::PlottersBackend::new(
        &config.out_dir,
        config.fig_width.clone(),
        config.fig_height.clone(),
    );

    let paths = pipeline::run(config, &backend)
        .with_context(|| format!("processing {}", config.archive_path.display()))?;
    Ok(paths.len())
}
