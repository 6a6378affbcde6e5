//! Initial world layout: attractors plus a ring of orbiting particles.
//!
//! Particles are placed in the `z = 0` plane at a uniformly random radius
//! in `[ring_min_radius, ring_max_radius]` and a uniformly random angle,
//! moving tangentially at the circular-orbit speed `sqrt(G * M / r)` where
//! `M` is the combined mass of the configured attractors.

use std::f64::consts::TAU;

use nbody_physics::{Body, Vec3};
use rand::Rng;

use crate::config::WorldConfig;

/// Build a fresh body collection: attractors first, then the ring.
pub fn populate(world: &WorldConfig, gravitational_constant: f64, rng: &mut impl Rng) -> Vec<Body> {
    let capacity = world
        .attractors
        .len()
        .saturating_add(usize::try_from(world.particle_count).unwrap_or(0));
    let mut bodies = Vec::with_capacity(capacity);

    bodies.extend(
        world
            .attractors
            .iter()
            .map(|a| Body::attractor(a.position, a.mass)),
    );

    let central_mass: f64 = world.attractors.iter().map(|a| a.mass).sum();
    for _ in 0..world.particle_count {
        bodies.push(ring_particle(world, gravitational_constant, central_mass, rng));
    }

    bodies
}

/// Circular-orbit speed at radius `r` around mass `central_mass`.
pub fn orbital_speed(gravitational_constant: f64, central_mass: f64, r: f64) -> f64 {
    (gravitational_constant * central_mass / r).sqrt()
}

fn ring_particle(
    world: &WorldConfig,
    gravitational_constant: f64,
    central_mass: f64,
    rng: &mut impl Rng,
) -> Body {
    let span = world.ring_max_radius - world.ring_min_radius;
    let r = span.mul_add(rng.random::<f64>(), world.ring_min_radius);
    let angle = TAU * rng.random::<f64>();
    let (sin, cos) = angle.sin_cos();

    let speed = orbital_speed(gravitational_constant, central_mass, r);
    let position = Vec3::new(r * cos, r * sin, 0.0);
    let velocity = Vec3::new(-speed * sin, speed * cos, 0.0);

    Body::particle(position, velocity, world.particle_mass)
}
