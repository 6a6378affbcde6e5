//! The simulation engine: one lock-guarded body collection.
//!
//! [`Simulation`] is the single owner of the authoritative bodies. Every
//! access path -- the stepper's [`step`](Simulation::step), the mutation
//! API ([`create_body`](Simulation::create_body),
//! [`delete_body`](Simulation::delete_body), [`reset`](Simulation::reset)),
//! and [`snapshot`](Simulation::snapshot) -- takes the same mutex for the
//! whole operation. Nobody ever sees a half-advanced step or a torn copy.
//!
//! # States
//!
//! The engine starts **Running**. [`stop`](Simulation::stop) moves it to
//! **Stopped**, which is terminal for stepping: later `step` calls are
//! no-ops. The collection stays readable and mutable after stopping.
//!
//! # Deletion handles
//!
//! Bodies are addressed by their position in the collection. Deleting
//! index `i` shifts every later body down by one, so an index is only
//! meaningful against the most recent snapshot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use nbody_physics::{Body, PhysicsParams, Vec3, integrator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::{NBodyConfig, WorldConfig};
use crate::seed;

/// Point-in-time counters read under the engine lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStatus {
    /// Whether the stepper is still allowed to advance the state.
    pub running: bool,
    /// Total bodies, attractors included.
    pub bodies: usize,
    /// Attractor bodies.
    pub attractors: usize,
    /// Steps executed since the last reset.
    pub steps: u64,
}

/// Everything the lock guards.
#[derive(Debug)]
struct SimulationState {
    bodies: Vec<Body>,
    steps: u64,
    running: bool,
    rng: StdRng,
}

/// Thread-safe gravity simulation.
///
/// Share it behind an [`Arc`](std::sync::Arc); all methods take `&self`.
#[derive(Debug)]
pub struct Simulation {
    state: Mutex<SimulationState>,
    physics: PhysicsParams,
    world: WorldConfig,
}

impl Simulation {
    /// Create a running simulation seeded from `world`.
    pub fn new(physics: PhysicsParams, world: WorldConfig) -> Self {
        let mut rng = world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let bodies = seed::populate(&world, physics.gravitational_constant, &mut rng);

        info!(
            bodies = bodies.len(),
            attractors = world.attractors.len(),
            seeded = world.seed.is_some(),
            "Simulation initialized"
        );

        Self {
            state: Mutex::new(SimulationState {
                bodies,
                steps: 0,
                running: true,
                rng,
            }),
            physics,
            world,
        }
    }

    /// Create a running simulation from the full server configuration.
    pub fn from_config(config: &NBodyConfig) -> Self {
        Self::new(config.physics, config.world.clone())
    }

    /// Create a running simulation over an explicit collection.
    ///
    /// [`reset`](Self::reset) still rebuilds from `world`.
    pub fn with_bodies(physics: PhysicsParams, world: WorldConfig, bodies: Vec<Body>) -> Self {
        let rng = world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            state: Mutex::new(SimulationState {
                bodies,
                steps: 0,
                running: true,
                rng,
            }),
            physics,
            world,
        }
    }

    /// Scoped access to the guarded state.
    ///
    /// A panic while the lock was held cannot leave the collection in a
    /// state worse than "some bodies advanced", so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance one time step and re-pin every attractor.
    ///
    /// Returns `false` without touching the state once stopped.
    pub fn step(&self) -> bool {
        let mut state = self.lock();
        if !state.running {
            return false;
        }

        integrator::step(&mut state.bodies, &self.physics);
        for body in state.bodies.iter_mut().filter(|b| b.is_attractor()) {
            body.repin();
        }
        state.steps = state.steps.saturating_add(1);
        true
    }

    /// Append a body and return a copy of it.
    ///
    /// Nothing is validated: zero or negative mass and non-finite
    /// components are stored as given.
    pub fn create_body(&self, position: Vec3, velocity: Vec3, mass: f64, is_attractor: bool) -> Body {
        let body = Body::new(position, velocity, mass, is_attractor);
        let mut state = self.lock();
        state.bodies.push(body.clone());
        debug!(index = state.bodies.len().saturating_sub(1), is_attractor, "Body created");
        body
    }

    /// Remove the body at `index`.
    ///
    /// Returns `false` and leaves the collection untouched when `index` is
    /// negative or not below the current length.
    pub fn delete_body(&self, index: i64) -> bool {
        let mut state = self.lock();
        let Some(index) = usize::try_from(index)
            .ok()
            .filter(|i| *i < state.bodies.len())
        else {
            return false;
        };
        state.bodies.remove(index);
        debug!(index, remaining = state.bodies.len(), "Body deleted");
        true
    }

    /// Discard every body and rebuild the initial layout.
    ///
    /// Does not restart a stopped engine.
    pub fn reset(&self) {
        let mut state = self.lock();
        let state = &mut *state;
        state.bodies = seed::populate(&self.world, self.physics.gravitational_constant, &mut state.rng);
        state.steps = 0;
        info!(bodies = state.bodies.len(), "Simulation reset");
    }

    /// Stop stepping. Once this returns, no further step takes effect.
    ///
    /// Returns `true` only for the call that moved the engine from Running
    /// to Stopped.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if !state.running {
            return false;
        }
        state.running = false;
        info!(steps = state.steps, "Simulation stopped");
        true
    }

    /// Whether the engine still steps.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// A consistent copy of the whole collection, in order.
    pub fn snapshot(&self) -> Vec<Body> {
        self.lock().bodies.clone()
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.lock().bodies.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().bodies.is_empty()
    }

    /// Steps executed since the last reset.
    pub fn step_count(&self) -> u64 {
        self.lock().steps
    }

    /// Counters read together under one lock acquisition.
    pub fn status(&self) -> SimulationStatus {
        let state = self.lock();
        SimulationStatus {
            running: state.running,
            bodies: state.bodies.len(),
            attractors: state.bodies.iter().filter(|b| b.is_attractor()).count(),
            steps: state.steps,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn small_simulation() -> Simulation {
        let world = WorldConfig {
            particle_count: 20,
            seed: Some(11),
            ..WorldConfig::default()
        };
        Simulation::new(PhysicsParams::default(), world)
    }

    #[test]
    fn starts_running_with_attractor_and_ring() {
        let sim = small_simulation();
        let status = sim.status();
        assert!(status.running);
        assert_eq!(status.bodies, 21);
        assert_eq!(status.attractors, 1);
        assert_eq!(status.steps, 0);
    }

    #[test]
    fn step_counts_and_moves_particles() {
        let sim = small_simulation();
        let before = sim.snapshot();
        assert!(sim.step());
        let after = sim.snapshot();
        assert_eq!(sim.step_count(), 1);
        assert_ne!(before[1].position, after[1].position);
    }

    #[test]
    fn attractors_stay_pinned_across_steps() {
        let sim = small_simulation();
        let far = sim.create_body(Vec3::new(500.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0), 1e6, true);
        for _ in 0..200 {
            sim.step();
        }
        let bodies = sim.snapshot();
        assert_eq!(bodies[0].position, Vec3::ZERO);
        assert_eq!(bodies[0].velocity, Vec3::ZERO);
        let last = bodies.last().unwrap();
        assert_eq!(last.position, far.position);
        assert_eq!(last.velocity, far.velocity);
    }

    #[test]
    fn repins_externally_disturbed_attractor() {
        let mut bodies = vec![Body::attractor(Vec3::ZERO, 100.0)];
        bodies[0].position = Vec3::new(3.0, 3.0, 3.0);
        bodies[0].velocity = Vec3::new(1.0, 1.0, 1.0);
        let sim = Simulation::with_bodies(PhysicsParams::default(), WorldConfig::default(), bodies);
        sim.step();
        let after = sim.snapshot();
        assert_eq!(after[0].position, Vec3::ZERO);
        assert_eq!(after[0].velocity, Vec3::ZERO);
    }

    #[test]
    fn delete_in_range_removes_and_shifts() {
        let sim = small_simulation();
        let before = sim.snapshot();
        assert!(sim.delete_body(1));
        let after = sim.snapshot();
        assert_eq!(after.len(), before.len() - 1);
        assert!(!after.contains(&before[1]));
        assert_eq!(after[1], before[2]);
    }

    #[test]
    fn delete_out_of_range_is_rejected() {
        let sim = small_simulation();
        let n = i64::try_from(sim.len()).unwrap();
        for index in [-1, n, n + 1, i64::MIN, i64::MAX] {
            assert!(!sim.delete_body(index), "index {index} accepted");
        }
        assert_eq!(sim.len(), 21);
    }

    #[test]
    fn delete_last_valid_index() {
        let sim = small_simulation();
        let n = i64::try_from(sim.len()).unwrap();
        assert!(sim.delete_body(n - 1));
        assert_eq!(sim.len(), 20);
    }

    #[test]
    fn create_stores_extreme_values_unchanged() {
        let sim = small_simulation();
        let max = Vec3::new(f64::MAX, f64::MAX, f64::MAX);
        let created = sim.create_body(max, max, f64::MAX, false);
        let stored = sim.snapshot().pop().unwrap();
        assert_eq!(stored, created);
        assert_eq!(stored.x(), f64::MAX);
        assert_eq!(stored.vz(), f64::MAX);
        assert_eq!(stored.mass, f64::MAX);
    }

    #[test]
    fn create_accepts_negative_mass_and_origin() {
        let sim = small_simulation();
        let negative = sim.create_body(Vec3::new(100.0, 100.0, 100.0), Vec3::new(1.0, 1.0, 1.0), -1.0, false);
        assert_eq!(negative.mass, -1.0);
        let origin = sim.create_body(Vec3::ZERO, Vec3::ZERO, 1.0, false);
        assert_eq!(origin.position, Vec3::ZERO);
        assert_eq!(sim.len(), 23);
    }

    #[test]
    fn reset_rebuilds_initial_layout() {
        let sim = small_simulation();
        sim.create_body(Vec3::ZERO, Vec3::ZERO, 1.0, false);
        sim.delete_body(0);
        sim.step();
        sim.reset();
        let status = sim.status();
        assert_eq!(status.bodies, 21);
        assert_eq!(status.attractors, 1);
        assert_eq!(status.steps, 0);
        assert!(sim.snapshot()[0].is_attractor());
    }

    #[test]
    fn stopped_engine_ignores_steps_but_accepts_mutations() {
        let sim = small_simulation();
        sim.stop();
        let before = sim.snapshot();
        assert!(!sim.step());
        assert_eq!(sim.snapshot(), before);
        assert!(!sim.is_running());

        sim.create_body(Vec3::ZERO, Vec3::ZERO, 1.0, false);
        assert_eq!(sim.len(), before.len() + 1);
        sim.reset();
        assert!(!sim.is_running());
    }

    #[test]
    fn stop_reports_only_the_first_transition() {
        let sim = std::sync::Arc::new(small_simulation());
        let racers: Vec<_> = (0..8)
            .map(|_| {
                let sim = std::sync::Arc::clone(&sim);
                std::thread::spawn(move || sim.stop())
            })
            .collect();
        let winners = racers
            .into_iter()
            .map(|r| r.join().unwrap())
            .filter(|stopped| *stopped)
            .count();
        assert_eq!(winners, 1);
        assert!(!sim.stop());
    }

    #[test]
    fn two_body_scenario_uses_euler_ordering() {
        let world = WorldConfig {
            particle_count: 0,
            attractors: Vec::new(),
            ..WorldConfig::default()
        };
        let bodies = vec![
            Body::attractor(Vec3::ZERO, 100.0),
            Body::particle(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), 1.0),
        ];
        let sim = Simulation::with_bodies(PhysicsParams::default(), world, bodies);
        let before = sim.snapshot()[1].clone();
        sim.step();
        let after = sim.snapshot()[1].clone();
        assert_eq!(after.position, before.position + before.velocity * 0.05);
    }
}
