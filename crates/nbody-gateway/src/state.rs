//! Shared application state for the gateway.
//!
//! [`AppState`] bundles the engine, the broadcast scheduler, and the
//! command router so every handler and every `WebSocket` connection works
//! against the same instances.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nbody_core::Simulation;
use nbody_core::config::NBodyConfig;

use crate::dispatch::CommandRouter;
use crate::scheduler::BroadcastScheduler;

/// State shared by all routes.
#[derive(Debug)]
pub struct AppState {
    /// The running simulation.
    pub simulation: Arc<Simulation>,
    /// Per-observer frame delivery.
    pub scheduler: Arc<BroadcastScheduler>,
    /// Applies inbound observer commands.
    pub commands: CommandRouter,
    /// Frames buffered per connection before the scheduler waits.
    pub outbound_buffer: usize,
    /// When the gateway was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire a scheduler and router around an existing simulation.
    pub fn new(simulation: Arc<Simulation>, config: &NBodyConfig) -> Self {
        let scheduler = Arc::new(BroadcastScheduler::new(Arc::clone(&simulation)));
        let commands = CommandRouter::new(
            Arc::clone(&simulation),
            Arc::clone(&scheduler),
            config.spawn.clone(),
        );
        Self {
            simulation,
            scheduler,
            commands,
            outbound_buffer: config.broadcast.outbound_buffer,
            started_at: Utc::now(),
        }
    }

    /// Build a fresh simulation from `config` and wrap it.
    pub fn from_config(config: &NBodyConfig) -> Self {
        Self::new(Arc::new(Simulation::from_config(config)), config)
    }

    /// Seconds since the gateway was created.
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
