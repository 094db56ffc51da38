//! Pairwise repulsion between points.
//!
//! The term for point `i` only reads the position snapshot, so the index
//! range is split into contiguous chunks, one per worker, each writing its own
//! slice of the output. The parallel iterator returns only when every chunk
//! is done.

use glam::Vec3;
use rayon::prelude::*;
use rayon::ThreadPool;

use super::constants::DEFAULT_FALLOFF;

/// Sum of `(p_i - p_j) / |p_i - p_j|^falloff` over all `j != i`.
///
/// Coincident points have no defined direction and are skipped, as is any
/// contribution that overflows.
pub fn repulsion_term(points: &[Vec3], i: usize, falloff: f32) -> Vec3 {
    let p = points[i];
    points.iter().fold(Vec3::ZERO, |acc, &q| {
        let diff = p - q;
        let dist_sq = diff.length_squared();
        if dist_sq == 0.0 {
            return acc;
        }
        let contribution = diff / falloff_scale(dist_sq, falloff);
        if contribution.is_finite() {
            acc + contribution
        } else {
            acc
        }
    })
}

/// `|d|^falloff` from `|d|^2`.
#[inline]
fn falloff_scale(dist_sq: f32, falloff: f32) -> f32 {
    if falloff == DEFAULT_FALLOFF {
        dist_sq * dist_sq.sqrt()
    } else {
        dist_sq.powf(falloff * 0.5)
    }
}

/// Fill `out[i]` with the repulsion term of every point.
///
/// Runs on `pool` when given, otherwise on the calling thread.
pub fn repulsion_terms(points: &[Vec3], falloff: f32, out: &mut [Vec3], pool: Option<&ThreadPool>) {
    debug_assert_eq!(points.len(), out.len());

    let Some(pool) = pool else {
        for (i, term) in out.iter_mut().enumerate() {
            *term = repulsion_term(points, i, falloff);
        }
        return;
    };

    let workers = pool.current_num_threads().clamp(1, points.len().max(1));
    let chunk_size = points.len().div_ceil(workers).max(1);
    pool.install(|| {
        out.par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(chunk, terms)| {
                let start = chunk * chunk_size;
                for (offset, term) in terms.iter_mut().enumerate() {
                    *term = repulsion_term(points, start + offset, falloff);
                }
            });
    });
}
