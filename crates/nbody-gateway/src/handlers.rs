//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/status` | Engine counters and uptime |
//! | `GET` | `/api/bodies` | One state frame |
//! | `POST` | `/api/simulation/reset` | Rebuild the initial layout |
//! | `POST` | `/api/simulation/stop` | Stop the stepper |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse};
use serde::Serialize;
use tracing::info;

use crate::error::GatewayError;
use crate::frame::StateFrame;
use crate::state::AppState;

/// Body of `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Whether the stepper still advances the state.
    pub running: bool,
    /// Total bodies.
    pub bodies: usize,
    /// Attractor bodies.
    pub attractors: usize,
    /// Steps since the last reset.
    pub steps: u64,
    /// Live observer subscriptions.
    pub observers: usize,
    /// RFC 3339 start time.
    pub started_at: String,
    /// Seconds since start.
    pub uptime_seconds: i64,
}

/// Body of the mutating endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    /// Whether the action took effect.
    pub ok: bool,
    /// Human-readable description.
    pub message: String,
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with live counters and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.simulation.status();
    let observers = state.scheduler.subscriber_count().await;
    let label = if status.running { "RUNNING" } else { "STOPPED" };
    let bodies = status.bodies;
    let steps = status.steps;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>NBody Server</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
        }}
        .label {{ color: #8b949e; font-size: 0.85rem; }}
        .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; }}
    </style>
</head>
<body>
    <h1>NBody Server</h1>
    <p>Status: <strong>{label}</strong></p>
    <div>
        <div class="metric"><div class="label">Bodies</div><div class="value">{bodies}</div></div>
        <div class="metric"><div class="label">Steps</div><div class="value">{steps}</div></div>
        <div class="metric"><div class="label">Observers</div><div class="value">{observers}</div></div>
    </div>
    <p>Stream: <code>ws://HOST/nbody</code></p>
    <ul>
        <li><a href="/api/status">/api/status</a></li>
        <li><a href="/api/bodies">/api/bodies</a></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Report engine counters, observer count and uptime.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.simulation.status();
    let observers = state.scheduler.subscriber_count().await;

    Json(StatusResponse {
        running: status.running,
        bodies: status.bodies,
        attractors: status.attractors,
        steps: status.steps,
        observers,
        started_at: state.started_at.to_rfc3339(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/bodies
// ---------------------------------------------------------------------------

/// Return one state frame, identical to what observers receive.
pub async fn bodies(State(state): State<Arc<AppState>>) -> Json<StateFrame> {
    Json(StateFrame::from_bodies(&state.simulation.snapshot()))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/reset
// ---------------------------------------------------------------------------

/// Discard all bodies and rebuild the initial layout.
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    state.simulation.reset();
    let bodies = state.simulation.len();
    info!(bodies, "Reset requested over HTTP");

    Json(ActionResponse {
        ok: true,
        message: format!("Simulation reset with {bodies} bodies"),
    })
}

// ---------------------------------------------------------------------------
// POST /api/simulation/stop
// ---------------------------------------------------------------------------

/// Stop the stepper. Observers keep receiving the frozen state.
///
/// # Errors
///
/// Returns [`GatewayError::Conflict`] if the engine was already stopped.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, GatewayError> {
    if !state.simulation.stop() {
        return Err(GatewayError::Conflict(
            "simulation is already stopped".to_owned(),
        ));
    }
    info!("Stop requested over HTTP");

    Ok(Json(ActionResponse {
        ok: true,
        message: "Simulation stopped".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(format!("no route for {uri}"))
}
