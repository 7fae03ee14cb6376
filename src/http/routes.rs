use super::handlers;
use super::state::AppState;
use crate::config::RecordingConfig;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, recording: &RecordingConfig) -> Router {
    let download_prefix = recording.download_prefix.trim_end_matches('/');
    let download_prefix = if download_prefix.is_empty() {
        "/recordings"
    } else {
        download_prefix
    };

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session allocation and connections
        .route("/start-session", get(handlers::start_session))
        .route("/ws", get(handlers::connect_socket))
        // Session queries
        .route("/sessions/:code", get(handlers::get_session_status))
        // Finished recordings
        .nest_service(download_prefix, ServeDir::new(&recording.recordings_path))
        // Browser client
        .fallback_service(ServeDir::new(&recording.public_path))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
