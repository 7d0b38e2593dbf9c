//! HTTP endpoints and router

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use receptionist_core::AppointmentDraft;
use receptionist_persistence::{Appointment, PersistenceError};

use crate::phone;
use crate::state::AppState;
use crate::websocket::ws_handler;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Appointment REST surface
        .route("/api/appointments", get(list_appointments))
        .route("/api/book-appointment", post(book_appointment))
        // Health check
        .route("/health", get(health_check))
        // Streaming binding
        .route("/ws/ai", get(ws_handler))
        // Call-control binding
        .route("/api/voice", post(phone::handle_voice))
        .route("/api/process_speech", post(phone::handle_process_speech))
        .route("/api/voicemail", post(phone::handle_voicemail))
        .route("/api/call_status", post(phone::handle_call_status))
        .layer(TraceLayer::new_for_http())
        // Browser client is served from another origin in development
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "dialogue_bound": state.model.is_some(),
        "active_sessions": state.sessions.len(),
    }))
}

/// GET /api/appointments
async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ServerError> {
    let appointments = state.persistence.appointments.list_recent(100).await?;
    Ok(Json(appointments))
}

/// POST /api/book-appointment
///
/// Direct booking without a conversation; the same completeness rule
/// applies as for extracted drafts.
async fn book_appointment(
    State(state): State<AppState>,
    Json(draft): Json<AppointmentDraft>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    if !draft.is_committable() {
        let missing: Vec<String> = draft
            .missing_fields()
            .iter()
            .map(|f| format!("{:?}", f))
            .collect();
        return Err(ServerError::InvalidRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let appointment = Appointment::from_draft(&draft);
    state.persistence.appointments.save(&appointment).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "ok", "data": appointment })),
    ))
}

impl From<PersistenceError> for ServerError {
    fn from(err: PersistenceError) -> Self {
        ServerError::Persistence(err.to_string())
    }
}
