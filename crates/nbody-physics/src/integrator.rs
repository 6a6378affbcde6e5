//! Fixed-step integrator over a whole body collection.
//!
//! One call to [`step`] advances every particle by `time_step`. The phases
//! run in a fixed order that defines the discretization:
//!
//! 1. Every particle moves along the velocity left by the previous step.
//! 2. Every force accumulator is cleared.
//! 3. Every particle accumulates the pull of every attractor. Attractors
//!    receive nothing, not even from each other.
//! 4. Every particle's velocity absorbs the force from phase 3.
//!
//! Swapping phases 1 and 4 changes orbit stability, so the order is part
//! of the contract. Cost is `O(P * A)` for `P` particles and `A`
//! attractors.

use serde::Deserialize;

use crate::body::Body;

/// Physical constants shared by every step.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PhysicsParams {
    /// Gravitational constant `G`.
    #[serde(default = "default_gravitational_constant")]
    pub gravitational_constant: f64,

    /// Distance added to every separation before the inverse-square law.
    #[serde(default = "default_softening")]
    pub softening: f64,

    /// Simulated time advanced per step.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravitational_constant: default_gravitational_constant(),
            softening: default_softening(),
            time_step: default_time_step(),
        }
    }
}

const fn default_gravitational_constant() -> f64 {
    0.1
}

const fn default_softening() -> f64 {
    1e-3
}

const fn default_time_step() -> f64 {
    0.05
}

/// Advance the collection by one time step.
///
/// Attractors are not moved here; pinning them back to their anchors is
/// the engine's job once the step completes.
pub fn step(bodies: &mut [Body], params: &PhysicsParams) {
    let dt = params.time_step;

    for body in bodies.iter_mut().filter(|b| !b.is_attractor()) {
        body.advance_position(dt);
    }

    for body in bodies.iter_mut() {
        body.reset_force();
    }

    // Attractors are few; copying them sidesteps aliasing the slice.
    let attractors: Vec<Body> = bodies.iter().filter(|b| b.is_attractor()).cloned().collect();
    if !attractors.is_empty() {
        for body in bodies.iter_mut().filter(|b| !b.is_attractor()) {
            for attractor in &attractors {
                body.accumulate_force_from(attractor, params.gravitational_constant, params.softening);
            }
        }
    }

    for body in bodies.iter_mut().filter(|b| !b.is_attractor()) {
        body.advance_velocity(dt);
    }
}
