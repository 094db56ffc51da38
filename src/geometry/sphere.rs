use glam::Vec3;
use rand::Rng;

/// How a fresh set of points is spread over the sphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Layout {
    /// Uniform random sampling.
    #[default]
    Random,
    /// Deterministic golden-angle spiral.
    Arranged,
}

impl Layout {
    /// Generate `n` points on the unit sphere following this layout.
    pub fn generate<R: Rng>(self, n: usize, rng: &mut R) -> Vec<Vec3> {
        match self {
            Layout::Random => random_sphere_points_with_rng(n, rng),
            Layout::Arranged => arranged_sphere_points(n),
        }
    }
}

/// Generate `n` uniformly distributed random points on a unit sphere.
pub fn random_sphere_points(n: usize) -> Vec<Vec3> {
    let mut rng = rand::thread_rng();
    random_sphere_points_with_rng(n, &mut rng)
}

/// Generate `n` uniformly distributed random points on a unit sphere using a provided RNG.
pub fn random_sphere_points_with_rng<R: Rng>(n: usize, rng: &mut R) -> Vec<Vec3> {
    (0..n)
        .map(|_| {
            // Uniform azimuth, uniform height: Archimedes' hat-box theorem gives uniform area.
            let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let height: f32 = rng.gen_range(-1.0..1.0);
            let width = (1.0 - height * height).sqrt();
            Vec3::new(width * theta.cos(), height, width * theta.sin())
        })
        .collect()
}

/// Generate `n` points on a golden-angle spiral.
///
/// Azimuth advances by the golden angle, inclination is spaced so every point
/// covers the same band area. The result is deterministic and near-uniform.
pub fn arranged_sphere_points(n: usize) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (1.0 + 5.0f32.sqrt());
    (0..n)
        .map(|i| {
            let k = i as f32 + 0.5;
            let theta = golden * k;
            let phi = (1.0 - 2.0 * k / n as f32).acos();
            let (width, height) = phi.sin_cos();
            Vec3::new(width * theta.cos(), height, width * theta.sin())
        })
        .collect()
}

/// Normalize `v` onto the unit sphere, or `None` for zero-length or non-finite input.
#[inline]
pub fn to_sphere(v: Vec3) -> Option<Vec3> {
    v.try_normalize()
}

/// Remove the component of `v` along the unit normal `n`.
#[inline]
pub fn tangential(v: Vec3, n: Vec3) -> Vec3 {
    v - n * n.dot(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_points_on_unit_sphere() {
        let points = random_sphere_points(100);
        for p in &points {
            let len = p.length();
            assert!(
                (len - 1.0).abs() < 1e-6,
                "Point not on unit sphere: length = {}",
                len
            );
        }
    }

    #[test]
    fn test_arranged_points_on_unit_sphere_and_deterministic() {
        let a = arranged_sphere_points(64);
        let b = arranged_sphere_points(64);
        assert_eq!(a, b);
        for p in &a {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_arranged_points_cover_both_poles() {
        let points = arranged_sphere_points(200);
        let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!(max_y > 0.99, "top band missing: {}", max_y);
        assert!(min_y < -0.99, "bottom band missing: {}", min_y);
    }

    #[test]
    fn test_seeded_random_layout_is_reproducible() {
        let mut r1 = ChaCha8Rng::seed_from_u64(7);
        let mut r2 = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            Layout::Random.generate(16, &mut r1),
            Layout::Random.generate(16, &mut r2)
        );
    }

    #[test]
    fn test_tangential_is_orthogonal() {
        let n = Vec3::new(1.0, 2.0, -0.5).normalize();
        let t = tangential(Vec3::new(0.3, -4.0, 2.0), n);
        assert!(t.dot(n).abs() < 1e-5);
    }

    #[test]
    fn test_to_sphere_rejects_zero() {
        assert!(to_sphere(Vec3::ZERO).is_none());
        assert!(to_sphere(Vec3::new(f32::NAN, 0.0, 1.0)).is_none());
        let v = to_sphere(Vec3::new(0.0, 0.0, 3.0)).unwrap();
        assert!((v - Vec3::Z).length() < 1e-6);
    }
}
