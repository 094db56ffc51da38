use glam::Vec3;

use super::{GeometryError, SphericalVoronoi};

/// Source of hull and Voronoi data for a point set on the unit sphere.
///
/// Implementations receive at least 4 unit vectors and must return one
/// Delaunay triangle per Voronoi vertex and one cell per input point, with
/// cell rings in cyclic order (either orientation).
pub trait GeometryProvider {
    fn compute(&self, points: &[Vec3]) -> Result<SphericalVoronoi, GeometryError>;
}

/// Default provider backed by a qhull convex hull.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConvexHullProvider;

impl GeometryProvider for ConvexHullProvider {
    fn compute(&self, points: &[Vec3]) -> Result<SphericalVoronoi, GeometryError> {
        SphericalVoronoi::compute(points)
    }
}

impl<F> GeometryProvider for F
where
    F: Fn(&[Vec3]) -> Result<SphericalVoronoi, GeometryError>,
{
    fn compute(&self, points: &[Vec3]) -> Result<SphericalVoronoi, GeometryError> {
        self(points)
    }
}
