//! Point generation on the unit sphere and hull/Voronoi construction.

mod convex_hull;
mod error;
mod provider;
mod sphere;
mod voronoi;

pub use convex_hull::*;
pub use error::GeometryError;
pub use provider::{ConvexHullProvider, GeometryProvider};
pub use sphere::*;
pub use voronoi::{SphericalVoronoi, VoronoiCell};
