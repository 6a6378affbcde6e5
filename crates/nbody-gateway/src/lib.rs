//! Observer gateway for the N-body simulation.
//!
//! This crate connects observers to a running
//! [`Simulation`](nbody_core::Simulation):
//!
//! - **`WebSocket` endpoint** (`/nbody`) where each observer sends JSON
//!   commands and receives state frames at its own chosen rate
//! - **[`BroadcastScheduler`]**, one timer task per subscribed observer
//! - **[`CommandRouter`]**, which decodes inbound commands and applies them
//!   to the engine or the scheduler
//! - **REST endpoints** for status, a one-off frame, reset and stop
//!
//! # Transport seam
//!
//! The scheduler never touches a socket directly. It sends through the
//! [`Transport`] trait; [`WsSession`] is the production implementation and
//! tests substitute their own.

pub mod dispatch;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod messages;
pub mod router;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod transport;
pub mod ws;

// Re-export primary types for convenience.
pub use dispatch::{CommandOutcome, CommandRouter};
pub use error::GatewayError;
pub use frame::{BodyFrame, StateFrame};
pub use messages::{Command, CommandError};
pub use router::build_router;
pub use scheduler::{BroadcastScheduler, SchedulerError};
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
pub use transport::{ObserverId, Transport, TransportError, WsSession};
