//! Command router: applies decoded observer commands.
//!
//! `SetRate` goes to the [`BroadcastScheduler`]; everything else mutates
//! the [`Simulation`]. A command either applies fully or is rejected
//! before touching any state.

use std::sync::Arc;

use nbody_core::Simulation;
use nbody_core::config::SpawnConfig;
use nbody_physics::Vec3;
use rand::Rng;

use crate::messages::{Command, CommandError};
use crate::scheduler::BroadcastScheduler;
use crate::transport::{ObserverId, Transport};

/// What a successfully handled command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The observer now streams at `fps`.
    Subscribed {
        /// Frames per second.
        fps: u32,
    },
    /// `count` bodies were appended.
    Created {
        /// Bodies appended.
        count: u32,
    },
    /// The body at `index` was removed.
    Deleted {
        /// Removed index.
        index: i64,
    },
    /// `index` was out of range; nothing changed.
    DeleteRejected {
        /// Rejected index.
        index: i64,
    },
    /// The simulation was rebuilt.
    Reset,
}

/// Routes commands to the engine and the scheduler.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    simulation: Arc<Simulation>,
    scheduler: Arc<BroadcastScheduler>,
    spawn: SpawnConfig,
}

impl CommandRouter {
    /// Create a router over the shared engine and scheduler.
    pub const fn new(
        simulation: Arc<Simulation>,
        scheduler: Arc<BroadcastScheduler>,
        spawn: SpawnConfig,
    ) -> Self {
        Self {
            simulation,
            scheduler,
            spawn,
        }
    }

    /// Decode `text` and apply it on behalf of `observer`.
    pub async fn handle_text<T: Transport>(
        &self,
        observer: ObserverId,
        transport: &Arc<T>,
        text: &str,
    ) -> Result<CommandOutcome, CommandError> {
        let command = Command::decode(text)?;
        self.dispatch(observer, transport, command).await
    }

    /// Apply an already decoded command.
    pub async fn dispatch<T: Transport>(
        &self,
        observer: ObserverId,
        transport: &Arc<T>,
        command: Command,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::SetRate { fps } => {
                let rate = u32::try_from(fps)
                    .ok()
                    .filter(|r| *r > 0)
                    .ok_or(CommandError::InvalidRate { fps })?;
                self.scheduler
                    .subscribe(observer, Arc::clone(transport), rate)
                    .await?;
                Ok(CommandOutcome::Subscribed { fps: rate })
            }
            Command::CreateBodies {
                count,
                range,
                attractor,
            } => {
                let limit = self.spawn.max_batch;
                let count = u32::try_from(count)
                    .ok()
                    .filter(|c| *c <= limit)
                    .ok_or(CommandError::InvalidCount { count, limit })?;
                self.create_bodies(count, range, attractor);
                Ok(CommandOutcome::Created { count })
            }
            Command::DeleteBody { index } => {
                if self.simulation.delete_body(index) {
                    Ok(CommandOutcome::Deleted { index })
                } else {
                    Ok(CommandOutcome::DeleteRejected { index })
                }
            }
            Command::Reset => {
                self.simulation.reset();
                Ok(CommandOutcome::Reset)
            }
        }
    }

    /// Append `count` bodies with uniformly random position and velocity.
    ///
    /// Velocity shares the position `range` unless `spawn.velocity_range`
    /// overrides it.
    fn create_bodies(&self, count: u32, range: f64, attractor: bool) {
        let mass = if attractor {
            self.spawn.attractor_mass
        } else {
            self.spawn.particle_mass
        };
        let velocity_range = self.spawn.velocity_range.unwrap_or(range);
        let mut rng = rand::rng();
        for _ in 0..count {
            let position = random_vector(&mut rng, range);
            let velocity = random_vector(&mut rng, velocity_range);
            self.simulation.create_body(position, velocity, mass, attractor);
        }
    }
}

/// Each component uniform in `[-range, range]`.
fn random_vector(rng: &mut impl Rng, range: f64) -> Vec3 {
    let mut component = || rng.random::<f64>().mul_add(2.0, -1.0) * range;
    Vec3::new(component(), component(), component())
}
