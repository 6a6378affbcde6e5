//! Observer identity and the transport seam the scheduler sends through.
//!
//! The broadcast scheduler only needs two things from a connection: is it
//! still open, and can it take one more text frame. [`Transport`] captures
//! exactly that. [`WsSession`] is the production implementation: frames go
//! into a bounded channel drained by the connection's writer task, so a
//! slow socket back-pressures only its own subscription.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one connected observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while handing a frame to a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is gone.
    #[error("transport closed")]
    Closed,

    /// The frame could not be delivered. [`WsSession`] never returns
    /// this; it is for transports whose sends can fail while the peer is
    /// still connected.
    #[error("send failed: {0}")]
    Failed(String),
}

/// A connection the scheduler can push state frames to.
pub trait Transport: Send + Sync + 'static {
    /// Whether the peer can still receive frames.
    fn is_open(&self) -> bool;

    /// Deliver one text frame.
    fn send(&self, text: String) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Outbound half of an observer's `WebSocket` connection.
#[derive(Debug, Clone)]
pub struct WsSession {
    id: ObserverId,
    outbound: mpsc::Sender<String>,
    open: Arc<AtomicBool>,
}

impl WsSession {
    /// Create a session and the receiver its writer task drains.
    pub fn channel(id: ObserverId, buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(buffer.max(1));
        let session = Self {
            id,
            outbound,
            open: Arc::new(AtomicBool::new(true)),
        };
        (session, rx)
    }

    /// The observer this session belongs to.
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Mark the session closed. Later [`is_open`](Transport::is_open)
    /// calls return `false`.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Transport for WsSession {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.outbound.is_closed()
    }

    async fn send(&self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(text)
            .await
            .map_err(|_err| TransportError::Closed)
    }
}
