//! Error types for the gateway's HTTP surface.
//!
//! [`GatewayError`] converts into an Axum response with a JSON body of the
//! form `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with the current engine state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_their_status_codes() {
        let not_found = GatewayError::NotFound("no route".to_owned()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = GatewayError::Conflict("already stopped".to_owned()).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }
}
