//! Snapshot export of the renderer arrays for external tools.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use geodetic_floes::{Geometry, PointModel, Statistics};

use super::AppConfig;

/// Export the current points and geometry to a JSON file (optionally gzipped).
pub fn export_model(
    model: &PointModel,
    config: &AppConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    print!("Exporting to {}... ", path.display());
    let start = Instant::now();

    let geometry = model
        .geometry()
        .filter(|_| !model.needs_update())
        .ok_or("export requires up-to-date geometry")?;
    let data = ModelExport::new(model, geometry, config);
    let file = File::create(path)?;

    let is_gzip = path.extension().map(|ext| ext == "gz").unwrap_or(false);
    if is_gzip {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(encoder, &data)?;
    } else {
        serde_json::to_writer(BufWriter::new(file), &data)?;
    }

    println!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

#[derive(Serialize)]
struct ModelExport {
    metadata: Metadata,
    statistics: Statistics,
    /// Points first, then Voronoi vertices.
    vertices: Vec<[f32; 3]>,
    velocities: Vec<[f32; 3]>,
    tris: Vec<[u32; 3]>,
    borders: Vec<[u32; 2]>,
    links: Vec<[u32; 2]>,
    degrees: Vec<u32>,
}

#[derive(Serialize)]
struct Metadata {
    seed: u64,
    num_points: usize,
    steps: u64,
    friction: f32,
    repulsion: f32,
    falloff: f32,
}

impl ModelExport {
    fn new(model: &PointModel, geometry: &Geometry, config: &AppConfig) -> Self {
        Self {
            metadata: Metadata {
                seed: config.seed,
                num_points: model.count(),
                steps: config.steps,
                friction: config.simulator.friction,
                repulsion: config.simulator.repulsion,
                falloff: config.simulator.falloff,
            },
            statistics: model.statistics(),
            vertices: geometry
                .combined_vertices()
                .iter()
                .map(|v| v.to_array())
                .collect(),
            velocities: model.translations().iter().map(|v| v.to_array()).collect(),
            tris: geometry.all_tris(),
            borders: geometry.all_borders(),
            links: geometry.all_links(),
            degrees: geometry.degrees.clone(),
        }
    }
}
