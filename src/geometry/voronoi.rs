use glam::Vec3;

use super::{ConvexHull, GeometryError};

/// A single Voronoi cell on the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index of the generator point for this cell.
    pub generator_index: usize,
    /// Indices into the `vertices` array of SphericalVoronoi, in cyclic order
    /// around the generator.
    pub vertex_indices: Vec<usize>,
}

/// A spherical Voronoi diagram together with its Delaunay dual.
#[derive(Debug, Clone)]
pub struct SphericalVoronoi {
    /// Delaunay triangles (convex hull facets) as generator index triples.
    pub triangles: Vec<[usize; 3]>,
    /// The Voronoi vertices, one per Delaunay triangle.
    pub vertices: Vec<Vec3>,
    /// The Voronoi cells, one per generator.
    pub cells: Vec<VoronoiCell>,
}

impl SphericalVoronoi {
    /// Compute the spherical Voronoi diagram from points on a unit sphere.
    ///
    /// For points on a sphere centered at origin the convex hull facets form
    /// the Delaunay triangulation, and its dual graph is the Voronoi diagram.
    pub fn compute(points: &[Vec3]) -> Result<Self, GeometryError> {
        let hull = ConvexHull::compute(points)?;
        Ok(Self::from_hull(points, &hull))
    }

    /// Build the diagram from an already computed hull of `points`.
    pub fn from_hull(points: &[Vec3], hull: &ConvexHull) -> Self {
        let triangles: Vec<[usize; 3]> = hull.facets.iter().map(|f| f.indices).collect();

        // Voronoi vertices are the circumcenters of the hull facets
        let vertices: Vec<Vec3> = triangles
            .iter()
            .map(|&[a, b, c]| circumcenter_on_sphere(points[a], points[b], points[c]))
            .collect();

        let mut point_to_facets: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
        for (facet_idx, facet) in triangles.iter().enumerate() {
            for &point_idx in facet {
                point_to_facets[point_idx].push(facet_idx);
            }
        }

        let cells = point_to_facets
            .into_iter()
            .enumerate()
            .map(|(point_idx, facets)| VoronoiCell {
                generator_index: point_idx,
                vertex_indices: order_vertices_ccw(points[point_idx], &facets, &vertices),
            })
            .collect();

        SphericalVoronoi {
            triangles,
            vertices,
            cells,
        }
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Compute the circumcenter of a spherical triangle and project it to the sphere.
fn circumcenter_on_sphere(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    // The circumcenter is perpendicular to both (b-a) and (c-a)
    let normal = (b - a).cross(c - a);
    let center = normal.normalize();

    // Pick the hemisphere of the triangle itself
    let centroid = a + b + c;
    if center.dot(centroid) < 0.0 {
        -center
    } else {
        center
    }
}

/// Order vertex indices counter-clockwise around a generator point when viewed from outside.
fn order_vertices_ccw(generator: Vec3, vertex_indices: &[usize], vertices: &[Vec3]) -> Vec<usize> {
    if vertex_indices.len() <= 2 {
        return vertex_indices.to_vec();
    }

    let mut indexed: Vec<(usize, f32)> = vertex_indices
        .iter()
        .map(|&idx| (idx, angle_in_tangent_plane(generator, vertices[idx])))
        .collect();

    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    indexed.into_iter().map(|(idx, _)| idx).collect()
}

/// Compute the angle of a point in the tangent plane at the generator.
fn angle_in_tangent_plane(generator: Vec3, point: Vec3) -> f32 {
    let up = if generator.y.abs() < 0.9 {
        Vec3::Y
    } else {
        Vec3::X
    };

    // (tangent_x, tangent_y, generator) is right-handed
    let tangent_x = generator.cross(up).normalize();
    let tangent_y = generator.cross(tangent_x).normalize();

    let to_point = point - generator * generator.dot(point);

    let x = to_point.dot(tangent_x);
    let y = to_point.dot(tangent_y);

    y.atan2(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{arranged_sphere_points, random_sphere_points};

    #[test]
    fn test_voronoi_basic() {
        let points = random_sphere_points(20);
        let voronoi = SphericalVoronoi::compute(&points).unwrap();

        assert_eq!(voronoi.num_cells(), 20);
        assert_eq!(voronoi.vertices.len(), 2 * 20 - 4);

        for cell in &voronoi.cells {
            assert!(
                cell.vertex_indices.len() >= 3,
                "Cell has {} vertices",
                cell.vertex_indices.len()
            );
        }
    }

    #[test]
    fn test_voronoi_vertices_equidistant_from_triangle() {
        let points = arranged_sphere_points(50);
        let voronoi = SphericalVoronoi::compute(&points).unwrap();

        for (tri, v) in voronoi.triangles.iter().zip(&voronoi.vertices) {
            assert!((v.length() - 1.0).abs() < 1e-4);
            let d0 = v.dot(points[tri[0]]);
            let d1 = v.dot(points[tri[1]]);
            let d2 = v.dot(points[tri[2]]);
            assert!((d0 - d1).abs() < 1e-4 && (d1 - d2).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cells_wound_counter_clockwise() {
        let points = arranged_sphere_points(40);
        let voronoi = SphericalVoronoi::compute(&points).unwrap();

        for cell in &voronoi.cells {
            let g = points[cell.generator_index];
            let ring = &cell.vertex_indices;
            for k in 0..ring.len() {
                let a = voronoi.vertices[ring[k]];
                let b = voronoi.vertices[ring[(k + 1) % ring.len()]];
                assert!(a.cross(b).dot(g) > 0.0, "cell {} not CCW", cell.generator_index);
            }
        }
    }
}
