//! Fixed-cadence background stepper.
//!
//! [`spawn_stepper`] runs [`Simulation::step`] on a Tokio interval until
//! the engine is stopped. The loop checks the running state once per
//! cycle, at the step boundary, and never interrupts a step in progress.
//! It performs no I/O; its only contention is the engine lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::simulation::Simulation;

/// Drive the simulation until it is stopped.
///
/// Returns the number of steps this loop executed.
pub async fn run_stepper(simulation: Arc<Simulation>, interval: Duration) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_ms = interval.as_millis(), "Stepper starting");

    let mut executed: u64 = 0;
    loop {
        ticker.tick().await;
        if !simulation.step() {
            break;
        }
        executed = executed.saturating_add(1);
    }

    info!(executed, "Stepper exited");
    executed
}

/// Spawn [`run_stepper`] on the current Tokio runtime.
pub fn spawn_stepper(simulation: Arc<Simulation>, interval: Duration) -> JoinHandle<u64> {
    tokio::spawn(run_stepper(simulation, interval))
}
