use crate::error::{SessionError, SessionResult};
use crate::session::Role;
use serde::{Deserialize, Serialize};

/// Message received from a participant
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    HostConnect {
        code: String,
    },
    GuestConnect {
        code: String,
    },
    HostReady {
        code: String,
    },
    GuestReady {
        code: String,
    },
    HostAudio {
        code: String,
        #[serde(rename = "audioData")]
        audio_data: String, // Base64-encoded audio chunk
    },
    GuestAudio {
        code: String,
        #[serde(rename = "audioData")]
        audio_data: String,
    },
    Stop {
        code: String,
    },
}

/// What an inbound message asks for, with the role folded out of the type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    Connect(Role),
    Ready(Role),
    Audio(Role, &'a str),
    Stop,
}

impl InboundMessage {
    pub fn parse(text: &str) -> SessionResult<Self> {
        serde_json::from_str(text).map_err(|e| SessionError::Protocol(e.to_string()))
    }

    pub fn code(&self) -> &str {
        match self {
            InboundMessage::HostConnect { code }
            | InboundMessage::GuestConnect { code }
            | InboundMessage::HostReady { code }
            | InboundMessage::GuestReady { code }
            | InboundMessage::HostAudio { code, .. }
            | InboundMessage::GuestAudio { code, .. }
            | InboundMessage::Stop { code } => code,
        }
    }

    pub fn action(&self) -> Action<'_> {
        match self {
            InboundMessage::HostConnect { .. } => Action::Connect(Role::Host),
            InboundMessage::GuestConnect { .. } => Action::Connect(Role::Guest),
            InboundMessage::HostReady { .. } => Action::Ready(Role::Host),
            InboundMessage::GuestReady { .. } => Action::Ready(Role::Guest),
            InboundMessage::HostAudio { audio_data, .. } => Action::Audio(Role::Host, audio_data),
            InboundMessage::GuestAudio { audio_data, .. } => Action::Audio(Role::Guest, audio_data),
            InboundMessage::Stop { .. } => Action::Stop,
        }
    }
}

/// Notification sent to a participant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    StartSession {
        #[serde(rename = "startTime")]
        start_time: i64, // Epoch milliseconds
    },
    RecordingSaved {
        #[serde(rename = "downloadUrls", skip_serializing_if = "Option::is_none")]
        download_urls: Option<Vec<String>>,
    },
    RecordingEnded,
    Error {
        message: String,
    },
}

impl OutboundMessage {
    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
        }
    }
}
