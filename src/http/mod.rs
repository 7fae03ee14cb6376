//! HTTP server in front of the session relay
//!
//! - GET /start-session - Allocate a session code
//! - GET /ws - WebSocket connection for host and guest
//! - GET /sessions/:code - Session status
//! - GET /recordings/:file - Finished recordings
//! - GET /health - Health check
//! - everything else - Browser client assets

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
