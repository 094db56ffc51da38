use glam::Vec3;
use qhull::Qh;

use super::GeometryError;

/// A triangular facet of the convex hull, with indices into the original point array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HullFacet {
    pub indices: [usize; 3],
}

/// Result of computing a 3D convex hull.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    pub facets: Vec<HullFacet>,
}

impl ConvexHull {
    /// Compute the convex hull of a set of points on the unit sphere.
    ///
    /// Coplanar hull faces (four or more cocircular points) are split into
    /// triangles. Every input point must end up as a hull vertex; coplanar
    /// input or duplicates are reported instead of patched up.
    pub fn compute(points: &[Vec3]) -> Result<Self, GeometryError> {
        if points.len() < 4 {
            return Err(GeometryError::InsufficientPoints(points.len()));
        }

        // qhull expects iterables of [f64; N]
        let pts: Vec<[f64; 3]> = points
            .iter()
            .map(|p| [p.x as f64, p.y as f64, p.z as f64])
            .collect();

        // Qt: merged faces come back as triangles
        let qh = Qh::builder()
            .compute(true)
            .triangulate(true)
            .build_from_iter(pts)
            .map_err(|e| GeometryError::Hull(format!("{:?}", e)))?;

        let mut facets = Vec::new();
        for hull_facet in qh.facets() {
            let facet = facets.len();
            let vertices: Vec<usize> = hull_facet
                .vertices()
                .ok_or_else(|| GeometryError::Hull(format!("facet {} has no vertex set", facet)))?
                .iter()
                .map(|v| {
                    v.index(&qh).ok_or_else(|| {
                        GeometryError::Hull(format!("facet {} references an unknown vertex", facet))
                    })
                })
                .collect::<Result<_, _>>()?;

            match vertices.as_slice() {
                &[a, b, c] => facets.push(HullFacet { indices: [a, b, c] }),
                other => {
                    return Err(GeometryError::NonSimplicialFacet {
                        facet,
                        vertices: other.len(),
                    })
                }
            }
        }

        let hull = ConvexHull { facets };
        hull.check_closed(points.len())?;
        Ok(hull)
    }

    /// Verify the facets triangulate a sphere over all `n` points.
    fn check_closed(&self, n: usize) -> Result<(), GeometryError> {
        let mut seen = vec![false; n];
        for facet in &self.facets {
            for &i in &facet.indices {
                seen[i] = true;
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(GeometryError::MissingPoint(missing));
        }

        // Euler: V - E + F = 2 with 3F = 2E
        let expected = 2 * n - 4;
        if self.facets.len() != expected {
            return Err(GeometryError::FacetCount {
                points: n,
                found: self.facets.len(),
                expected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_tetrahedron() {
        // A tetrahedron has 4 facets
        let points = vec![
            Vec3::new(1.0, 0.0, -1.0 / 2.0_f32.sqrt()),
            Vec3::new(-1.0, 0.0, -1.0 / 2.0_f32.sqrt()),
            Vec3::new(0.0, 1.0, 1.0 / 2.0_f32.sqrt()),
            Vec3::new(0.0, -1.0, 1.0 / 2.0_f32.sqrt()),
        ];
        let hull = ConvexHull::compute(&points).unwrap();
        assert_eq!(hull.facets.len(), 4);
    }

    #[test]
    fn test_hull_octahedron() {
        let points = vec![Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let hull = ConvexHull::compute(&points).unwrap();
        assert_eq!(hull.facets.len(), 8);
    }

    #[test]
    fn test_hull_cube_faces_are_triangulated() {
        let mut points = Vec::new();
        for x in [-1.0f32, 1.0] {
            for y in [-1.0f32, 1.0] {
                for z in [-1.0f32, 1.0] {
                    points.push(Vec3::new(x, y, z).normalize());
                }
            }
        }
        let hull = ConvexHull::compute(&points).unwrap();
        assert_eq!(hull.facets.len(), 12);
    }

    #[test]
    fn test_hull_too_few_points() {
        let points = vec![Vec3::X, Vec3::Y, Vec3::Z];
        assert_eq!(
            ConvexHull::compute(&points).unwrap_err(),
            GeometryError::InsufficientPoints(3)
        );
    }

    #[test]
    fn test_hull_coplanar_points_fail() {
        let points = vec![Vec3::X, Vec3::Y, -Vec3::X, -Vec3::Y, Vec3::new(0.6, 0.8, 0.0)];
        assert!(ConvexHull::compute(&points).is_err());
    }
}
