//! Vector math, body model, and fixed-step integrator for the N-body simulation.
//!
//! Everything in this crate is synchronous and free of shared state. The
//! engine in `nbody-core` owns the body collection and calls into
//! [`integrator::step`] under its own lock.
//!
//! # Modules
//!
//! - [`vector`] -- [`Vec3`], the three-component value type used for
//!   positions, velocities, and forces.
//! - [`body`] -- [`Body`], a point mass with a force accumulator and the
//!   per-step update primitives.
//! - [`integrator`] -- [`PhysicsParams`] and the single-step update over a
//!   whole body collection.

pub mod body;
pub mod integrator;
pub mod vector;

pub use body::{Anchor, Body};
pub use integrator::{PhysicsParams, step};
pub use vector::Vec3;
