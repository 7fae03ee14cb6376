use super::role::PerRole;
use super::session::SessionState;
use crate::recording::SinkState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of a session, served by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Six-digit session code
    pub code: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// When the code was allocated
    pub created_at: DateTime<Utc>,

    /// Whether each role currently has a live connection bound
    pub connected: PerRole<bool>,

    /// Readiness flags per role
    pub ready: PerRole<bool>,

    /// Sink state per role
    pub sinks: PerRole<SinkState>,

    /// Set once any sink write or open has failed
    pub degraded: bool,
}
