use super::state::AppState;
use crate::error::SessionError;
use crate::relay;
use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    #[serde(rename = "uniqueCode")]
    pub unique_code: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /start-session
/// Allocate a new session code
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    let unique_code = state.registry.allocate().await;
    Json(StartSessionResponse { unique_code })
}

/// GET /ws
/// Upgrade to the duplex session connection
pub async fn connect_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        relay::run_connection(socket, state.router, state.reconciler, state.send_queue)
    })
}

/// GET /sessions/:code
/// Snapshot of an active session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match state.registry.lookup(&code).await {
        Ok(session) => (StatusCode::OK, Json(session.snapshot().await)).into_response(),
        Err(e @ SessionError::SessionNotFound(_)) => {
            debug!("Status requested for unknown session {}", code);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
