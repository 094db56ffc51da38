use thiserror::Error;

/// Failure to build hull or Voronoi data for a point configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("need at least 4 points for a spherical hull, got {0}")]
    InsufficientPoints(usize),

    #[error("convex hull computation failed: {0}")]
    Hull(String),

    #[error("hull facet {facet} has {vertices} vertices, expected a triangle")]
    NonSimplicialFacet { facet: usize, vertices: usize },

    #[error("point {0} is not a hull vertex (coincident or interior point)")]
    MissingPoint(usize),

    #[error("hull has {found} facets, expected {expected} for {points} points")]
    FacetCount {
        points: usize,
        found: usize,
        expected: usize,
    },

    #[error("provider returned malformed data: {0}")]
    Malformed(String),
}
