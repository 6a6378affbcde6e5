//! Point-mass body model.
//!
//! A [`Body`] is either a free particle or an attractor. Particles move
//! under the force accumulated from attractors each step; attractors exert
//! force but never receive it, and carry an [`Anchor`] they are re-pinned
//! to after every step.
//!
//! # Force accumulator
//!
//! The `force` field is scratch state. It is zeroed by
//! [`reset_force`](Body::reset_force) at the start of the force phase,
//! filled by [`accumulate_force_from`](Body::accumulate_force_from), and
//! consumed by [`advance_velocity`](Body::advance_velocity) in the same
//! step. It is never read across steps.
//!
//! Mass is not validated. Zero or negative mass yields infinite or
//! inverted acceleration, which is accepted for experimentation.

use crate::vector::Vec3;

/// Designated state an attractor is restored to after each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Pinned position.
    pub position: Vec3,
    /// Pinned velocity.
    pub velocity: Vec3,
}

/// A simulated point mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Current position.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    /// Force accumulated during the current step.
    pub force: Vec3,
    /// Mass (unvalidated).
    pub mass: f64,
    is_attractor: bool,
    anchor: Option<Anchor>,
}

impl Default for Body {
    /// A unit-mass particle at rest at the origin.
    fn default() -> Self {
        Self::particle(Vec3::ZERO, Vec3::ZERO, 1.0)
    }
}

impl Body {
    /// Create a body. Attractors are anchored at the given position and
    /// velocity.
    pub const fn new(position: Vec3, velocity: Vec3, mass: f64, is_attractor: bool) -> Self {
        let anchor = if is_attractor {
            Some(Anchor { position, velocity })
        } else {
            None
        };
        Self {
            position,
            velocity,
            force: Vec3::ZERO,
            mass,
            is_attractor,
            anchor,
        }
    }

    /// Create a free particle.
    pub const fn particle(position: Vec3, velocity: Vec3, mass: f64) -> Self {
        Self::new(position, velocity, mass, false)
    }

    /// Create an attractor at rest at `position`.
    pub const fn attractor(position: Vec3, mass: f64) -> Self {
        Self::new(position, Vec3::ZERO, mass, true)
    }

    /// Zero the force accumulator.
    pub const fn reset_force(&mut self) {
        self.force = Vec3::ZERO;
    }

    /// Add the gravitational pull of `other` on `self` to the accumulator.
    ///
    /// `softening` is added to the separation before the inverse-square
    /// law is applied, so coincident bodies produce a large but finite
    /// force. The caller must never pass `self` as `other`.
    pub fn accumulate_force_from(&mut self, other: &Self, gravitational_constant: f64, softening: f64) {
        let direction = other.position.subtract(self.position);
        let distance = direction.length() + softening;
        let magnitude = gravitational_constant * self.mass * other.mass / (distance * distance);
        self.force = self.force.add(direction.scale(magnitude / distance));
    }

    /// Move along the current velocity for `dt`.
    pub const fn advance_position(&mut self, dt: f64) {
        self.position = self.position.add(self.velocity.scale(dt));
    }

    /// Apply the accumulated force for `dt`.
    pub const fn advance_velocity(&mut self, dt: f64) {
        let acceleration = self.force.scale(1.0 / self.mass);
        self.velocity = self.velocity.add(acceleration.scale(dt));
    }

    /// Restore an attractor to its anchor. No-op for particles.
    pub const fn repin(&mut self) {
        if let Some(anchor) = self.anchor {
            self.position = anchor.position;
            self.velocity = anchor.velocity;
        }
    }

    /// Whether this body is an attractor.
    pub const fn is_attractor(&self) -> bool {
        self.is_attractor
    }

    /// Flag or unflag the body as an attractor.
    ///
    /// Flagging anchors the body at its current position and velocity.
    pub const fn set_attractor(&mut self, is_attractor: bool) {
        self.is_attractor = is_attractor;
        self.anchor = if is_attractor {
            Some(Anchor {
                position: self.position,
                velocity: self.velocity,
            })
        } else {
            None
        };
    }

    /// The anchor an attractor is re-pinned to.
    pub const fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    /// Position X.
    pub const fn x(&self) -> f64 {
        self.position.x
    }

    /// Position Y.
    pub const fn y(&self) -> f64 {
        self.position.y
    }

    /// Position Z.
    pub const fn z(&self) -> f64 {
        self.position.z
    }

    /// Velocity X.
    pub const fn vx(&self) -> f64 {
        self.velocity.x
    }

    /// Velocity Y.
    pub const fn vy(&self) -> f64 {
        self.velocity.y
    }

    /// Velocity Z.
    pub const fn vz(&self) -> f64 {
        self.velocity.z
    }

    /// Set position X.
    pub const fn set_x(&mut self, x: f64) {
        self.position.x = x;
    }

    /// Set position Y.
    pub const fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }

    /// Set position Z.
    pub const fn set_z(&mut self, z: f64) {
        self.position.z = z;
    }

    /// Set velocity X.
    pub const fn set_vx(&mut self, vx: f64) {
        self.velocity.x = vx;
    }

    /// Set velocity Y.
    pub const fn set_vy(&mut self, vy: f64) {
        self.velocity.y = vy;
    }

    /// Set velocity Z.
    pub const fn set_vz(&mut self, vz: f64) {
        self.velocity.z = vz;
    }
}
