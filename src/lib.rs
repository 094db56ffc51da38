//! Points relaxed on the unit sphere by pairwise repulsion, with the spherical
//! Voronoi/Delaunay structure derived for rendering.
//!
//! # Example
//!
//! ```no_run
//! use geodetic_floes::{Layout, PointModel, RepulsionSimulator, SimulatorConfig};
//!
//! let mut model = PointModel::new(200, Layout::Random)?;
//! let mut simulator = RepulsionSimulator::new(SimulatorConfig::default())?;
//!
//! simulator.steps = 100;
//! simulator.simulate(&mut model);
//! if model.needs_update() {
//!     model.update_geometry()?;
//! }
//! let geometry = model.geometry().expect("just rebuilt");
//! assert_eq!(geometry.degrees.iter().sum::<u32>() as usize, 6 * 200 - 12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod geometry;
pub mod model;
pub mod sim;
pub mod util;

pub use geometry::{ConvexHullProvider, GeometryError, GeometryProvider, Layout};
pub use model::{Geometry, IndexRemap, ModelError, PointModel, Statistics, MIN_POINTS};
pub use sim::{RepulsionSimulator, SimulatorConfig, SimulatorError};
