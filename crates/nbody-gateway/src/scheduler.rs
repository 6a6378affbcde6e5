//! Per-observer broadcast scheduler.
//!
//! Each subscribed observer gets its own Tokio task that wakes every
//! `1000 / fps` milliseconds, takes a [`Simulation::snapshot`], encodes a
//! [`StateFrame`], and hands it to the observer's [`Transport`]. Tasks are
//! independent: a slow transport stalls only its own task, never another
//! observer or the stepper.
//!
//! # Registry
//!
//! Live subscriptions are kept in a map keyed by [`ObserverId`], at most
//! one per observer. Subscribing again replaces the old task while the
//! registry lock is held, so two timers for one observer never coexist.
//! Each subscription carries a generation number; a task that notices its
//! transport closed removes its entry only if the generation still
//! matches, so it can never evict its own replacement.
//!
//! # Cancellation
//!
//! Every delivery runs while holding the subscription's gate. Cancelling
//! aborts the task and then takes the gate and marks it closed, so once
//! [`cancel`](BroadcastScheduler::cancel) returns no delivery can still be
//! in flight or start later.
//!
//! [`shutdown`](BroadcastScheduler::shutdown) is final: later subscribe
//! calls are refused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use nbody_core::Simulation;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::frame::StateFrame;
use crate::transport::{ObserverId, Transport};

/// Errors raised by the scheduler itself.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A rate of zero frames per second was requested.
    #[error("frame rate must be at least 1 fps")]
    InvalidRate,

    /// The scheduler has been shut down.
    #[error("broadcast scheduler is shut down")]
    ShutDown,
}

/// One live subscription.
struct Subscription {
    fps: u32,
    generation: u64,
    gate: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop the task and guarantee nothing more is sent.
    async fn shut_down(self) {
        self.task.abort();
        *self.gate.lock().await = true;
    }
}

/// Fans simulation snapshots out to observers at their own rates.
pub struct BroadcastScheduler {
    simulation: Arc<Simulation>,
    registry: Mutex<HashMap<ObserverId, Subscription>>,
    next_generation: AtomicU64,
    /// Set under the registry lock by `shutdown`, read under it by `subscribe`.
    closed: AtomicBool,
}

impl core::fmt::Debug for BroadcastScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BroadcastScheduler")
            .field("next_generation", &self.next_generation)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl BroadcastScheduler {
    /// Create a scheduler reading from `simulation`.
    pub fn new(simulation: Arc<Simulation>) -> Self {
        Self {
            simulation,
            registry: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Start streaming to `observer` at `fps`, replacing any existing
    /// subscription for it.
    ///
    /// The first frame is sent immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidRate`] for a zero rate and
    /// [`SchedulerError::ShutDown`] once [`shutdown`](Self::shutdown) has run.
    pub async fn subscribe<T: Transport>(
        self: &Arc<Self>,
        observer: ObserverId,
        transport: Arc<T>,
        fps: u32,
    ) -> Result<(), SchedulerError> {
        if fps == 0 {
            return Err(SchedulerError::InvalidRate);
        }
        let period = frame_period(fps);

        let mut registry = self.registry.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        if let Some(previous) = registry.remove(&observer) {
            debug!(%observer, previous_fps = previous.fps, "Replacing subscription");
            previous.shut_down().await;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let gate = Arc::new(Mutex::new(false));
        let task = tokio::spawn(deliver(
            Arc::downgrade(self),
            Arc::clone(&self.simulation),
            observer,
            generation,
            transport,
            Arc::clone(&gate),
            period,
        ));

        registry.insert(
            observer,
            Subscription {
                fps,
                generation,
                gate,
                task,
            },
        );
        debug!(%observer, fps, period_ms = period.as_millis(), "Observer subscribed");
        Ok(())
    }

    /// Stop streaming to `observer`. Returns whether a subscription existed.
    pub async fn cancel(&self, observer: ObserverId) -> bool {
        let removed = self.registry.lock().await.remove(&observer);
        match removed {
            Some(subscription) => {
                subscription.shut_down().await;
                debug!(%observer, "Subscription cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every subscription and refuse new ones.
    pub async fn shutdown(&self) {
        let drained: Vec<Subscription> = {
            let mut registry = self.registry.lock().await;
            self.closed.store(true, Ordering::Release);
            registry.drain().map(|(_, sub)| sub).collect()
        };
        let count = drained.len();
        for subscription in drained {
            subscription.shut_down().await;
        }
        info!(cancelled = count, "Broadcast scheduler shut down");
    }

    /// Number of live subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// The rate `observer` is subscribed at, if any.
    pub async fn rate_of(&self, observer: ObserverId) -> Option<u32> {
        self.registry.lock().await.get(&observer).map(|sub| sub.fps)
    }

    /// Drop the entry for a task that ended itself, unless it was replaced.
    async fn retire(&self, observer: ObserverId, generation: u64) {
        let mut registry = self.registry.lock().await;
        if registry
            .get(&observer)
            .is_some_and(|sub| sub.generation == generation)
        {
            registry.remove(&observer);
            debug!(%observer, "Subscription removed after transport closed");
        }
    }
}

/// Interval between frames at `fps`, never shorter than one millisecond.
fn frame_period(fps: u32) -> Duration {
    let millis = 1000_u64.checked_div(u64::from(fps)).unwrap_or(1000);
    Duration::from_millis(millis.max(1))
}

/// Body of one subscription task.
async fn deliver<T: Transport>(
    scheduler: Weak<BroadcastScheduler>,
    simulation: Arc<Simulation>,
    observer: ObserverId,
    generation: u64,
    transport: Arc<T>,
    gate: Arc<Mutex<bool>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut closed = gate.lock().await;
        if *closed {
            return;
        }

        if !transport.is_open() {
            *closed = true;
            drop(closed);
            if let Some(scheduler) = scheduler.upgrade() {
                scheduler.retire(observer, generation).await;
            }
            return;
        }

        let bodies = simulation.snapshot();
        match StateFrame::from_bodies(&bodies).to_json() {
            Ok(text) => {
                if let Err(e) = transport.send(text).await {
                    debug!(%observer, error = %e, "Frame send failed");
                }
            }
            Err(e) => warn!(%observer, error = %e, "Failed to encode state frame"),
        }
        drop(closed);
    }
}
