use glam::Vec3;
use rayon::prelude::*;
use serde::Serialize;

/// Snapshot of how evenly the points are spread.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub temperature: f32,
    /// Angular distance to the nearest other point, in radians.
    pub spacing: Spacing,
    /// `degree_histogram[d]` = number of cells with `d` neighbours.
    /// Empty while the geometry is stale.
    pub degree_histogram: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Spacing {
    pub min: f32,
    pub mean: f32,
    pub max: f32,
}

impl Statistics {
    /// Ratio of smallest to largest nearest-neighbour distance; 1.0 is perfectly even.
    pub fn uniformity(&self) -> f32 {
        if self.spacing.max > 0.0 {
            self.spacing.min / self.spacing.max
        } else {
            0.0
        }
    }
}

/// Nearest-neighbour angular spacing over all points.
pub(crate) fn spacing(points: &[Vec3]) -> Spacing {
    let nearest: Vec<f32> = points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let closest = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, q)| p.dot(*q))
                .fold(-1.0f32, f32::max);
            closest.clamp(-1.0, 1.0).acos()
        })
        .collect();

    if nearest.is_empty() {
        return Spacing {
            min: 0.0,
            mean: 0.0,
            max: 0.0,
        };
    }
    let min = nearest.iter().copied().fold(f32::MAX, f32::min);
    let max = nearest.iter().copied().fold(0.0, f32::max);
    let mean = nearest.iter().sum::<f32>() / nearest.len() as f32;
    Spacing { min, mean, max }
}

pub(crate) fn degree_histogram(degrees: &[u32]) -> Vec<usize> {
    let top = degrees.iter().copied().max().unwrap_or(0) as usize;
    let mut histogram = vec![0; top + 1];
    for &d in degrees {
        histogram[d as usize] += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octahedron_spacing_is_right_angle() {
        let points = vec![Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let s = spacing(&points);
        let right = std::f32::consts::FRAC_PI_2;
        assert!((s.min - right).abs() < 1e-5);
        assert!((s.max - right).abs() < 1e-5);
        assert!((s.mean - right).abs() < 1e-5);
    }

    #[test]
    fn test_degree_histogram() {
        assert_eq!(degree_histogram(&[5, 6, 6, 7, 6]), vec![0, 0, 0, 0, 0, 1, 3, 1]);
        assert!(degree_histogram(&[]) == vec![0]);
    }
}
