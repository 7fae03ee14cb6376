use crate::session::Role;
use thiserror::Error;

/// Faults scoped to a single session or connection.
///
/// None of these end the process or the connection; the router turns each
/// one into an `error` notification for the offending sender.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found.")]
    SessionNotFound(String),

    #[error("Invalid message: {0}")]
    Protocol(String),

    #[error("The {role} role of session {code} is already connected.")]
    DuplicateBinding { code: String, role: Role },

    #[error("Failed to save {role} audio for session {code}: {source}")]
    SinkWrite {
        code: String,
        role: Role,
        #[source]
        source: std::io::Error,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
