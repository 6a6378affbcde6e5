//! `WebSocket` handler for observer connections.
//!
//! Clients connect to `GET /nbody`. Nothing is streamed until the client
//! sends an `fps` command; after that the [`BroadcastScheduler`] pushes a
//! state frame at the requested rate. Every other text message is decoded
//! as a [`Command`](crate::messages::Command) and applied to the engine.
//!
//! The socket is split: a writer task owns the sink and drains the
//! connection's [`WsSession`] channel, while the handler task reads
//! commands. When the reader ends the session is closed and the
//! subscription cancelled before the writer is torn down.
//!
//! [`BroadcastScheduler`]: crate::scheduler::BroadcastScheduler

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::transport::{ObserverId, WsSession};

/// Upgrade an HTTP request to an observer `WebSocket`.
///
/// # Route
///
/// `GET /nbody`
pub async fn ws_observer(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one observer connection to completion.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let observer = ObserverId::new();
    let (session, mut outbound) = WsSession::channel(observer, state.outbound_buffer);
    let session = Arc::new(session);
    let (mut sink, mut stream) = socket.split();
    info!(%observer, "Observer connected");

    let writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!(%observer, "Observer socket closed during send");
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                match state
                    .commands
                    .handle_text(observer, &session, text.as_str())
                    .await
                {
                    Ok(outcome) => debug!(%observer, ?outcome, "Command applied"),
                    Err(e) => warn!(%observer, error = %e, "Command rejected"),
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%observer, error = %e, "Observer socket error");
                break;
            }
        }
    }

    session.close();
    state.scheduler.cancel(observer).await;
    writer.abort();
    info!(%observer, "Observer disconnected");
}
