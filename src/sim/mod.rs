//! Repulsion-driven relaxation of points on the sphere.
//!
//! One step sums the repulsion on every point (in parallel), adds it to the
//! point's velocity, drops the radial part of the velocity, damps it, moves
//! the point and puts it back on the sphere. Steps never overlap.

pub mod constants;
mod repulsion;

pub use repulsion::{repulsion_term, repulsion_terms};

use glam::Vec3;
use log::{debug, trace};
use rayon::ThreadPool;
use thiserror::Error;

use crate::geometry::{tangential, GeometryProvider};
use crate::model::PointModel;
use crate::util::Timed;
use self::constants::*;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("friction must be finite and non-negative, got {0}")]
    InvalidFriction(f32),

    #[error("repulsion must be finite and non-negative, got {0}")]
    InvalidRepulsion(f32),

    #[error("falloff must be finite and positive, got {0}")]
    InvalidFalloff(f32),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Parameters for a [`RepulsionSimulator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatorConfig {
    pub friction: f32,
    pub repulsion: f32,
    pub falloff: f32,
    /// Worker count for the force sum. `None` uses every hardware thread,
    /// `Some(1)` keeps everything on the calling thread.
    pub threads: Option<usize>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            repulsion: DEFAULT_REPULSION,
            falloff: DEFAULT_FALLOFF,
            threads: None,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(SimulatorError::InvalidFriction(self.friction));
        }
        if !self.repulsion.is_finite() || self.repulsion < 0.0 {
            return Err(SimulatorError::InvalidRepulsion(self.repulsion));
        }
        if !self.falloff.is_finite() || self.falloff <= 0.0 {
            return Err(SimulatorError::InvalidFalloff(self.falloff));
        }
        Ok(())
    }

    fn resolved_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Advances a [`PointModel`] by discrete repulsion steps.
pub struct RepulsionSimulator {
    pub friction: f32,
    pub repulsion: f32,
    pub falloff: f32,
    /// Pending work: `n > 0` runs `n` steps on the next [`simulate`](Self::simulate)
    /// call, `n < 0` runs one step per call while counting up to zero.
    pub steps: i64,
    pool: Option<ThreadPool>,
    forces: Vec<Vec3>,
}

impl RepulsionSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;

        let threads = config.resolved_threads();
        let pool = if threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("repulsion-{}", i))
                    .build()?,
            )
        } else {
            None
        };
        debug!("Repulsion simulator using {} worker(s)", threads);

        Ok(Self {
            friction: config.friction,
            repulsion: config.repulsion,
            falloff: config.falloff,
            steps: 0,
            pool,
            forces: Vec::new(),
        })
    }

    /// Number of threads the force sum is spread over.
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Run the pending `steps` and return how many steps ran.
    pub fn simulate<G: GeometryProvider>(&mut self, model: &mut PointModel<G>) -> usize {
        let runs = if self.steps < 0 { 1 } else { self.steps as usize };
        if runs == 0 {
            return 0;
        }

        let _t = Timed::trace(format!("{} simulation step(s)", runs));
        for _ in 0..runs {
            self.simulate_step(model);
        }

        if self.steps < 0 {
            self.steps += 1;
        } else {
            self.steps = 0;
        }
        runs
    }

    /// Advance every point by one step.
    pub fn simulate_step<G: GeometryProvider>(&mut self, model: &mut PointModel<G>) {
        let (vertices, translations) = model.state_mut();

        self.forces.resize(vertices.len(), Vec3::ZERO);
        repulsion_terms(vertices, self.falloff, &mut self.forces, self.pool.as_ref());

        for ((vertex, translation), force) in vertices
            .iter_mut()
            .zip(translations.iter_mut())
            .zip(&self.forces)
        {
            let pushed = *translation + self.repulsion * *force;
            // Project before damping so the drag only sees tangential speed
            let tangent = tangential(pushed, *vertex);
            let damped = tangent * (-self.friction * tangent.length_squared()).exp();

            *translation = damped;
            *vertex = (*vertex + damped).normalize();
        }

        trace!("Stepped {} points", vertices.len());
    }

    /// Change friction by `delta`, never below zero.
    pub fn nudge_friction(&mut self, delta: f32) {
        self.friction = (self.friction + delta).max(0.0);
    }

    /// Change repulsion by `delta`, never below zero.
    pub fn nudge_repulsion(&mut self, delta: f32) {
        self.repulsion = (self.repulsion + delta).max(0.0);
    }
}
