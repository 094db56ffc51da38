//! The point set on the sphere and its lazily rebuilt geometry.
//!
//! [`PointModel`] owns positions and velocities. Every mutation marks the
//! derived [`Geometry`] stale; [`PointModel::update_geometry`] rebuilds it with
//! one call into the [`GeometryProvider`]. A failed rebuild keeps the last
//! good geometry around so a renderer always has something consistent to draw.

mod derived;
mod remap;
mod stats;

pub use derived::Geometry;
pub use remap::IndexRemap;
pub use stats::{Spacing, Statistics};

use glam::Vec3;
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::geometry::{
    random_sphere_points_with_rng, to_sphere, ConvexHullProvider, GeometryError,
    GeometryProvider, Layout,
};
use crate::util::Timed;

/// Smallest point count that still spans a non-degenerate hull.
pub const MIN_POINTS: usize = 4;

/// Rejected mutations and failed geometry rebuilds.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("a model needs at least 4 points, operation would leave {remaining}")]
    TooFewPoints { remaining: usize },

    #[error("point index {index} out of range for {count} points")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("position {0} cannot be projected onto the sphere")]
    DegeneratePosition(Vec3),

    #[error("geometry rebuild failed: {0}")]
    Geometry(#[from] GeometryError),
}

/// Points on the unit sphere with per-point velocity and cached adjacency.
pub struct PointModel<G = ConvexHullProvider> {
    vertices: Vec<Vec3>,
    translations: Vec<Vec3>,
    geometry: Option<Geometry>,
    geometry_valid: bool,
    generation: u64,
    provider: G,
    rng: ChaCha8Rng,
}

impl PointModel<ConvexHullProvider> {
    /// Create `count` points with an entropy-seeded generator.
    pub fn new(count: usize, layout: Layout) -> Result<Self, ModelError> {
        Self::from_rng(count, layout, ChaCha8Rng::from_entropy())
    }

    /// Create `count` points with a reproducible generator.
    pub fn with_seed(count: usize, layout: Layout, seed: u64) -> Result<Self, ModelError> {
        Self::from_rng(count, layout, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create a model from explicit positions, each normalized onto the sphere.
    pub fn from_points(points: &[Vec3]) -> Result<Self, ModelError> {
        check_count(points.len())?;
        let vertices = normalize_all(points)?;
        Ok(Self::assemble(vertices, ChaCha8Rng::from_entropy()))
    }

    fn from_rng(count: usize, layout: Layout, mut rng: ChaCha8Rng) -> Result<Self, ModelError> {
        check_count(count)?;
        let vertices = layout.generate(count, &mut rng);
        Ok(Self::assemble(vertices, rng))
    }

    fn assemble(vertices: Vec<Vec3>, rng: ChaCha8Rng) -> Self {
        debug!("Created point model with {} points", vertices.len());
        Self {
            translations: vec![Vec3::ZERO; vertices.len()],
            vertices,
            geometry: None,
            geometry_valid: false,
            generation: 0,
            provider: ConvexHullProvider,
            rng,
        }
    }
}

impl<G: GeometryProvider> PointModel<G> {
    /// Swap the geometry provider. Cached geometry is dropped.
    pub fn with_provider<H: GeometryProvider>(self, provider: H) -> PointModel<H> {
        PointModel {
            vertices: self.vertices,
            translations: self.translations,
            geometry: None,
            geometry_valid: false,
            generation: self.generation,
            provider,
            rng: self.rng,
        }
    }

    pub fn count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn translations(&self) -> &[Vec3] {
        &self.translations
    }

    /// Sum of squared velocities; falls toward zero as the system settles.
    pub fn temperature(&self) -> f32 {
        self.translations.iter().map(|t| t.length_squared()).sum()
    }

    /// Index of the point closest (by angle) to `pos`.
    pub fn vertex_id_at(&self, pos: Vec3) -> usize {
        self.vertices
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.dot(pos).total_cmp(&b.dot(pos)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Append points at `positions`, projected onto the sphere, at rest.
    pub fn add_vertices_at(&mut self, positions: &[Vec3]) -> Result<(), ModelError> {
        let added = normalize_all(positions)?;
        if added.is_empty() {
            return Ok(());
        }
        self.translations
            .extend(std::iter::repeat(Vec3::ZERO).take(added.len()));
        self.vertices.extend(added);
        debug!("Added {} points ({} total)", positions.len(), self.count());
        self.invalidate();
        Ok(())
    }

    /// Append `count` random points.
    pub fn add_vertices(&mut self, count: usize) {
        let positions = random_sphere_points_with_rng(count, &mut self.rng);
        // Generated points are already unit length
        if let Err(e) = self.add_vertices_at(&positions) {
            warn!("Discarding generated points: {}", e);
        }
    }

    /// Delete the points at `ids`. Surviving points shift down to stay contiguous.
    pub fn remove_vertex_ids(&mut self, ids: &[usize]) -> Result<IndexRemap, ModelError> {
        let count = self.count();
        let mut keep = vec![true; count];
        for &id in ids {
            if id >= count {
                warn!("Rejected removal of point {} (have {})", id, count);
                return Err(ModelError::IndexOutOfRange { index: id, count });
            }
            keep[id] = false;
        }

        let remaining = keep.iter().filter(|&&k| k).count();
        if remaining == count {
            return Ok(IndexRemap::identity(count));
        }
        if remaining < MIN_POINTS {
            warn!("Rejected removal leaving {} points", remaining);
            return Err(ModelError::TooFewPoints { remaining });
        }

        self.vertices = compact(&self.vertices, &keep);
        self.translations = compact(&self.translations, &keep);
        debug!("Removed {} points ({} left)", count - remaining, remaining);
        self.invalidate();
        Ok(IndexRemap::from_keep_mask(&keep))
    }

    /// Delete up to `count` trailing points, never going below [`MIN_POINTS`].
    pub fn remove_vertices(&mut self, count: usize) -> IndexRemap {
        let n = self.count();
        let count = count.min(n.saturating_sub(MIN_POINTS));
        let ids: Vec<usize> = (n - count..n).collect();
        match self.remove_vertex_ids(&ids) {
            Ok(remap) => remap,
            Err(e) => {
                // Clamped above, so only reachable if the invariant is already broken
                warn!("Trailing removal failed: {}", e);
                IndexRemap::identity(n)
            }
        }
    }

    /// Add (`delta > 0`) or remove (`delta < 0`) points.
    pub fn resize(&mut self, delta: isize) -> IndexRemap {
        if delta >= 0 {
            let before = self.count();
            self.add_vertices(delta.unsigned_abs());
            IndexRemap::identity(before)
        } else {
            self.remove_vertices(delta.unsigned_abs())
        }
    }

    /// Move point `index` to `pos` (projected onto the sphere) and stop it.
    pub fn reset_vertex(&mut self, index: usize, pos: Vec3) -> Result<(), ModelError> {
        let count = self.count();
        if index >= count {
            return Err(ModelError::IndexOutOfRange { index, count });
        }
        let pos = to_sphere(pos).ok_or(ModelError::DegeneratePosition(pos))?;
        self.vertices[index] = pos;
        self.translations[index] = Vec3::ZERO;
        self.invalidate();
        Ok(())
    }

    /// Regenerate every point with `layout` and stop all motion.
    pub fn reset_all_vertices(&mut self, layout: Layout) {
        self.vertices = layout.generate(self.count(), &mut self.rng);
        self.translations.fill(Vec3::ZERO);
        debug!("Reset {} points ({:?})", self.count(), layout);
        self.invalidate();
    }

    /// True when positions changed since the last successful rebuild.
    pub fn needs_update(&self) -> bool {
        !self.geometry_valid
    }

    /// Rebuild the derived geometry if any point changed.
    ///
    /// On failure the previous geometry, if any, stays available through
    /// [`PointModel::geometry`] and the model keeps reporting
    /// [`PointModel::needs_update`].
    pub fn update_geometry(&mut self) -> Result<(), ModelError> {
        if self.geometry_valid {
            return Ok(());
        }

        let _t = Timed::debug("Geometry rebuild");
        let geometry = self
            .provider
            .compute(&self.vertices)
            .and_then(|voronoi| Geometry::build(&self.vertices, &voronoi))
            .map_err(|e| {
                warn!("Geometry rebuild failed for {} points: {}", self.count(), e);
                e
            })?;

        self.geometry = Some(geometry);
        self.geometry_valid = true;
        self.generation += 1;
        Ok(())
    }

    /// Last successfully built geometry. May be stale, see [`PointModel::needs_update`].
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Number of successful geometry rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Spacing and degree statistics for the current configuration.
    pub fn statistics(&self) -> Statistics {
        let degree_histogram = match (&self.geometry, self.geometry_valid) {
            (Some(geometry), true) => stats::degree_histogram(&geometry.degrees),
            _ => Vec::new(),
        };
        Statistics {
            count: self.count(),
            temperature: self.temperature(),
            spacing: stats::spacing(&self.vertices),
            degree_histogram,
        }
    }

    /// Positions and velocities for one simulation step. Marks geometry stale.
    pub(crate) fn state_mut(&mut self) -> (&mut [Vec3], &mut [Vec3]) {
        self.invalidate();
        (&mut self.vertices, &mut self.translations)
    }

    fn invalidate(&mut self) {
        self.geometry_valid = false;
    }
}

fn check_count(count: usize) -> Result<(), ModelError> {
    if count < MIN_POINTS {
        return Err(ModelError::TooFewPoints { remaining: count });
    }
    Ok(())
}

fn normalize_all(points: &[Vec3]) -> Result<Vec<Vec3>, ModelError> {
    points
        .iter()
        .map(|&p| to_sphere(p).ok_or(ModelError::DegeneratePosition(p)))
        .collect()
}

fn compact(values: &[Vec3], keep: &[bool]) -> Vec<Vec3> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, &k)| k)
        .map(|(v, _)| *v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::geometry::SphericalVoronoi;

    fn arranged(n: usize) -> PointModel {
        PointModel::with_seed(n, Layout::Arranged, 1).unwrap()
    }

    #[test]
    fn test_new_model_is_at_rest_and_stale() {
        let model = arranged(12);
        assert_eq!(model.count(), 12);
        assert_eq!(model.translations().len(), 12);
        assert_eq!(model.temperature(), 0.0);
        assert!(model.needs_update());
        assert!(model.geometry().is_none());
    }

    #[test]
    fn test_too_few_points_rejected() {
        assert_eq!(
            PointModel::with_seed(3, Layout::Random, 0).err(),
            Some(ModelError::TooFewPoints { remaining: 3 })
        );
    }

    #[test]
    fn test_add_vertices_at_normalizes() {
        let mut model = arranged(8);
        model
            .add_vertices_at(&[Vec3::new(0.0, 0.0, 5.0), Vec3::new(3.0, 4.0, 0.0)])
            .unwrap();
        assert_eq!(model.count(), 10);
        assert!((model.vertices()[8] - Vec3::Z).length() < 1e-6);
        assert!((model.vertices()[9] - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-6);
        assert_eq!(model.translations()[9], Vec3::ZERO);
    }

    #[test]
    fn test_add_zero_position_rejected_without_change() {
        let mut model = arranged(8);
        let err = model
            .add_vertices_at(&[Vec3::X, Vec3::ZERO])
            .unwrap_err();
        assert_eq!(err, ModelError::DegeneratePosition(Vec3::ZERO));
        assert_eq!(model.count(), 8);
    }

    #[test]
    fn test_remove_vertex_ids_compacts_and_remaps() {
        let mut model = arranged(10);
        let before = model.vertices().to_vec();
        let remap = model.remove_vertex_ids(&[2, 7, 2]).unwrap();

        assert_eq!(model.count(), 8);
        assert_eq!(remap.removed(), 2);
        assert_eq!(remap.apply(2), None);
        assert_eq!(remap.apply(3), Some(2));
        assert_eq!(model.vertices()[2], before[3]);
        assert_eq!(model.vertices()[6], before[8]);
    }

    #[test]
    fn test_remove_vertex_ids_rejects_bad_input() {
        let mut model = arranged(6);
        assert_eq!(
            model.remove_vertex_ids(&[6]).unwrap_err(),
            ModelError::IndexOutOfRange { index: 6, count: 6 }
        );
        assert_eq!(
            model.remove_vertex_ids(&[0, 1, 2]).unwrap_err(),
            ModelError::TooFewPoints { remaining: 3 }
        );
        assert_eq!(model.count(), 6);
    }

    #[test]
    fn test_remove_vertices_clamps_at_minimum() {
        let mut model = arranged(4);
        let remap = model.remove_vertices(10);
        assert_eq!(model.count(), 4);
        assert!(remap.is_identity());

        let mut model = arranged(9);
        let remap = model.remove_vertices(3);
        assert_eq!(model.count(), 6);
        assert_eq!(remap.apply(5), Some(5));
        assert_eq!(remap.apply(6), None);
    }

    #[test]
    fn test_resize_both_directions() {
        let mut model = arranged(10);
        model.resize(5);
        assert_eq!(model.count(), 15);
        model.resize(-20);
        assert_eq!(model.count(), MIN_POINTS);
    }

    #[test]
    fn test_reset_vertex() {
        let mut model = arranged(8);
        model.reset_vertex(3, Vec3::new(0.0, -2.0, 0.0)).unwrap();
        assert!((model.vertices()[3] + Vec3::Y).length() < 1e-6);
        assert!(model.reset_vertex(8, Vec3::X).is_err());
        assert!(model.reset_vertex(0, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_reset_all_vertices_arranged_is_deterministic() {
        let mut a = PointModel::with_seed(20, Layout::Random, 5).unwrap();
        let mut b = PointModel::with_seed(20, Layout::Random, 6).unwrap();
        a.reset_all_vertices(Layout::Arranged);
        b.reset_all_vertices(Layout::Arranged);
        assert_eq!(a.vertices(), b.vertices());
    }

    #[test]
    fn test_vertex_id_at_picks_nearest() {
        let mut model = arranged(16);
        model.reset_vertex(11, Vec3::Z).unwrap();
        assert_eq!(model.vertex_id_at(Vec3::Z), 11);
    }

    #[test]
    fn test_update_geometry_runs_provider_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut model = arranged(20).with_provider(move |points: &[Vec3]| {
            counter.set(counter.get() + 1);
            SphericalVoronoi::compute(points)
        });

        model.update_geometry().unwrap();
        model.update_geometry().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(model.generation(), 1);
        assert!(!model.needs_update());

        model.add_vertices(1);
        assert!(model.needs_update());
        model.update_geometry().unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(model.generation(), 2);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_geometry() {
        let fail = Rc::new(Cell::new(false));
        let switch = fail.clone();
        let mut model = arranged(12).with_provider(move |points: &[Vec3]| {
            if switch.get() {
                Err(GeometryError::Hull("forced".into()))
            } else {
                SphericalVoronoi::compute(points)
            }
        });

        model.update_geometry().unwrap();
        let links = model.geometry().unwrap().links.clone();

        fail.set(true);
        model.add_vertices(2);
        let err = model.update_geometry().unwrap_err();
        assert!(matches!(err, ModelError::Geometry(_)));
        assert!(model.needs_update());
        assert_eq!(model.generation(), 1);
        let stale = model.geometry().unwrap();
        assert_eq!(stale.point_count(), 12);
        assert_eq!(stale.links, links);
    }

    #[test]
    fn test_statistics_histogram_only_when_valid() {
        let mut model = arranged(32);
        assert!(model.statistics().degree_histogram.is_empty());
        model.update_geometry().unwrap();
        let stats = model.statistics();
        assert_eq!(stats.count, 32);
        let total: usize = stats
            .degree_histogram
            .iter()
            .enumerate()
            .map(|(d, n)| d * n)
            .sum();
        assert_eq!(total, 6 * 32 - 12);
        assert!(stats.uniformity() > 0.0 && stats.uniformity() <= 1.0);
    }
}
