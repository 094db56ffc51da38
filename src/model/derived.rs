//! Renderer-ready adjacency derived from a spherical Voronoi diagram.
//!
//! All index arrays address one combined vertex buffer: indices below the
//! point count refer to generator points, indices from the point count upward
//! refer to Voronoi vertices (see [`Geometry::combined_vertices`]).

use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::geometry::{GeometryError, SphericalVoronoi};

/// Adjacency, cell borders and cell fans for one point configuration.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// The points this geometry was built from.
    pub points: Vec<Vec3>,
    /// Voronoi vertex positions (2N - 4 of them in general position).
    pub voronoi_vertices: Vec<Vec3>,
    /// Sorted Delaunay neighbours of each point.
    pub links: Vec<Vec<u32>>,
    /// `links[i].len()`.
    pub degrees: Vec<u32>,
    /// Boundary edges of each cell, counter-clockwise from outside.
    pub borders: Vec<Vec<[u32; 2]>>,
    /// Fan triangles of each cell: `[point, previous corner, current corner]`.
    pub tris: Vec<Vec<[u32; 3]>>,
}

impl Geometry {
    /// Derive adjacency for `points` from the provider's diagram.
    ///
    /// The diagram is only read; rings with clockwise winding are reversed in
    /// a copy.
    pub fn build(points: &[Vec3], voronoi: &SphericalVoronoi) -> Result<Self, GeometryError> {
        let n = points.len();
        validate(n, voronoi)?;

        let links = build_links(n, &voronoi.triangles);
        check_ring_lengths(voronoi, &links)?;
        let degrees = links.iter().map(|l| l.len() as u32).collect();

        let mut borders = Vec::with_capacity(n);
        let mut tris = Vec::with_capacity(n);
        for (i, cell) in voronoi.cells.iter().enumerate() {
            let ring = wound_ccw(&cell.vertex_indices, &voronoi.vertices);
            let (cell_borders, cell_tris) = fan(i, n, &ring);
            borders.push(cell_borders);
            tris.push(cell_tris);
        }

        Ok(Self {
            points: points.to_vec(),
            voronoi_vertices: voronoi.vertices.clone(),
            links,
            degrees,
            borders,
            tris,
        })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// `points ++ voronoi_vertices`, the buffer every index array refers to.
    pub fn combined_vertices(&self) -> Vec<Vec3> {
        let mut all = Vec::with_capacity(self.points.len() + self.voronoi_vertices.len());
        all.extend_from_slice(&self.points);
        all.extend_from_slice(&self.voronoi_vertices);
        all
    }

    /// Every Delaunay edge once, as `[low, high]`.
    pub fn all_links(&self) -> Vec<[u32; 2]> {
        self.links
            .iter()
            .enumerate()
            .flat_map(|(i, neighbors)| {
                let i = i as u32;
                neighbors.iter().filter(move |&&j| i < j).map(move |&j| [i, j])
            })
            .collect()
    }

    /// Every Voronoi edge once. Each edge borders two cells, the first one seen wins.
    pub fn all_borders(&self) -> Vec<[u32; 2]> {
        let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
        let mut out = Vec::new();
        for &[a, b] in self.borders.iter().flatten() {
            if seen.insert((a.min(b), a.max(b))) {
                out.push([a, b]);
            }
        }
        out
    }

    /// All cell triangles in point order.
    pub fn all_tris(&self) -> Vec<[u32; 3]> {
        self.tris.iter().flatten().copied().collect()
    }

    /// All cell triangles, cells facing away from `eye` first.
    ///
    /// Blending translucent cells needs the far side of the sphere drawn
    /// before the near side.
    pub fn tris_back_to_front(&self, eye: Vec3) -> Vec<[u32; 3]> {
        let mut order: Vec<usize> = (0..self.points.len()).collect();
        order.sort_by(|&a, &b| {
            self.points[a]
                .dot(eye)
                .total_cmp(&self.points[b].dot(eye))
        });
        order
            .into_iter()
            .flat_map(|i| self.tris[i].iter().copied())
            .collect()
    }
}

/// Reject diagrams that cannot belong to `n` points.
fn validate(n: usize, voronoi: &SphericalVoronoi) -> Result<(), GeometryError> {
    if voronoi.cells.len() != n {
        return Err(GeometryError::Malformed(format!(
            "{} cells for {} points",
            voronoi.cells.len(),
            n
        )));
    }
    if let Some(tri) = voronoi.triangles.iter().find(|t| t.iter().any(|&i| i >= n)) {
        return Err(GeometryError::Malformed(format!(
            "triangle {:?} out of range",
            tri
        )));
    }
    let nv = voronoi.vertices.len();
    for (i, cell) in voronoi.cells.iter().enumerate() {
        if cell.vertex_indices.len() < 3 {
            return Err(GeometryError::Malformed(format!(
                "cell {} has {} corners",
                i,
                cell.vertex_indices.len()
            )));
        }
        if cell.vertex_indices.iter().any(|&v| v >= nv) {
            return Err(GeometryError::Malformed(format!(
                "cell {} references a missing Voronoi vertex",
                i
            )));
        }
    }
    Ok(())
}

/// Insert both directions of every triangle edge into each point's neighbour set.
fn build_links(n: usize, triangles: &[[usize; 3]]) -> Vec<Vec<u32>> {
    let mut links: Vec<Vec<u32>> = vec![Vec::new(); n];
    for tri in triangles {
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            links[a].push(b as u32);
            links[b].push(a as u32);
        }
    }
    for neighbors in &mut links {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    links
}

/// Each cell needs one corner per Delaunay neighbour.
fn check_ring_lengths(voronoi: &SphericalVoronoi, links: &[Vec<u32>]) -> Result<(), GeometryError> {
    for (i, (cell, neighbors)) in voronoi.cells.iter().zip(links).enumerate() {
        if cell.vertex_indices.len() != neighbors.len() {
            return Err(GeometryError::Malformed(format!(
                "cell {} has {} corners but {} neighbours",
                i,
                cell.vertex_indices.len(),
                neighbors.len()
            )));
        }
    }
    Ok(())
}

/// Copy of `ring`, reversed if its first corner turns clockwise seen from outside.
fn wound_ccw(ring: &[usize], vertices: &[Vec3]) -> Vec<usize> {
    let a = vertices[ring[0]];
    let b = vertices[ring[1]];
    let c = vertices[ring[2]];
    if (b - a).cross(c - b).dot(b) < 0.0 {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    }
}

/// Fan-triangulate cell `point` around its generator.
fn fan(point: usize, n: usize, ring: &[usize]) -> (Vec<[u32; 2]>, Vec<[u32; 3]>) {
    let offset = |v: usize| (v + n) as u32;
    let center = point as u32;
    let mut borders = Vec::with_capacity(ring.len());
    let mut tris = Vec::with_capacity(ring.len());
    let mut prev = ring[ring.len() - 1];
    for &cur in ring {
        borders.push([offset(prev), offset(cur)]);
        tris.push([center, offset(prev), offset(cur)]);
        prev = cur;
    }
    (borders, tris)
}
