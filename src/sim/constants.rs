//! Default simulation parameters.

/// Damping coefficient: velocities are scaled by `exp(-FRICTION * |v|^2)` each step.
pub const DEFAULT_FRICTION: f32 = 100.0;

/// Scale applied to the summed repulsion term before it is added to a velocity.
pub const DEFAULT_REPULSION: f32 = 5e-6;

/// Distance exponent of the repulsion term `diff / |diff|^FALLOFF`.
/// 3 makes the force fall off with the inverse square of the distance.
pub const DEFAULT_FALLOFF: f32 = 3.0;
