//! Configuration, seeding, and the simulation engine for the N-body server.
//!
//! This crate owns the authoritative body collection and the background
//! stepper that advances it.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `nbody-config.yaml` into
//!   strongly-typed structs.
//! - [`seed`] -- Initial attractor placement and the orbiting particle ring.
//! - [`simulation`] -- [`Simulation`], the lock-guarded engine with its
//!   mutation and snapshot API.
//! - [`runner`] -- The fixed-cadence stepper task.
//!
//! [`Simulation`]: simulation::Simulation

pub mod config;
pub mod runner;
pub mod seed;
pub mod simulation;

pub use simulation::{Simulation, SimulationStatus};
