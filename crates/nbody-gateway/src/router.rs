//! Axum router construction.
//!
//! Assembles the observer `WebSocket` and the REST routes into one
//! [`Router`] with CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// - `GET /` -- HTML status page
/// - `GET /nbody` -- observer `WebSocket`
/// - `GET /api/status` -- engine counters
/// - `GET /api/bodies` -- one state frame
/// - `POST /api/simulation/reset` -- rebuild the initial layout
/// - `POST /api/simulation/stop` -- stop the stepper
///
/// CORS allows any origin so a locally served front end can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/nbody", get(ws::ws_observer))
        .route("/api/status", get(handlers::status))
        .route("/api/bodies", get(handlers::bodies))
        .route("/api/simulation/reset", post(handlers::reset))
        .route("/api/simulation/stop", post(handlers::stop))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
