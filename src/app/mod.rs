//! Headless driver: relax a point set and report how it settles.

pub mod export;

use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};

use geodetic_floes::{Layout, PointModel, RepulsionSimulator, SimulatorConfig};

/// Configuration for the app from CLI arguments.
pub struct AppConfig {
    pub seed: u64,
    pub points: usize,
    pub layout: Layout,
    pub steps: u64,
    pub report_every: u64,
    pub simulator: SimulatorConfig,
    pub export_path: Option<PathBuf>,
}

pub fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut model = PointModel::with_seed(config.points, config.layout, config.seed)?;
    let mut simulator = RepulsionSimulator::new(config.simulator)?;
    println!(
        "Relaxing {} points: seed={}, layout={:?}, threads={}",
        model.count(),
        config.seed,
        config.layout,
        simulator.threads()
    );

    let start = Instant::now();
    let batch = config.report_every.max(1);
    let mut done = 0;
    while done < config.steps {
        let run = batch.min(config.steps - done);
        simulator.steps = run as i64;
        done += simulator.simulate(&mut model) as u64;
        report(&mut model, done);
    }
    println!(
        "Simulated {} steps in {:.1}ms",
        done,
        start.elapsed().as_secs_f64() * 1000.0
    );

    model.update_geometry()?;
    let stats = model.statistics();
    println!(
        "Final: temperature={:.3e}, spacing min/mean/max = {:.4}/{:.4}/{:.4} rad, uniformity={:.3}",
        stats.temperature,
        stats.spacing.min,
        stats.spacing.mean,
        stats.spacing.max,
        stats.uniformity()
    );

    if let Some(path) = &config.export_path {
        export::export_model(&model, config, path)?;
    }
    Ok(())
}

/// Rebuild geometry and log one progress line. A failed rebuild is only logged.
fn report(model: &mut PointModel, step: u64) {
    if let Err(e) = model.update_geometry() {
        warn!("Step {}: {}", step, e);
        return;
    }
    let stats = model.statistics();
    let degrees: Vec<String> = stats
        .degree_histogram
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .map(|(d, n)| format!("{}:{}", d, n))
        .collect();
    info!(
        "Step {}: temperature={:.3e}, uniformity={:.3}, degrees [{}]",
        step,
        stats.temperature,
        stats.uniformity(),
        degrees.join(" ")
    );
}
