//! Receptionist server
//!
//! Hosts the two turn-taking protocol bindings (WebSocket streaming
//! and call-control webhooks) plus the appointment REST surface.

pub mod http;
pub mod phone;
pub mod state;
pub mod twiml;
pub mod websocket;

pub use http::create_router;
pub use phone::{CallEvent, CallState};
pub use state::AppState;
pub use websocket::WsMessage;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Session(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
