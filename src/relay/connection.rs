use super::messages::OutboundMessage;
use crate::session::Role;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, warn};
use uuid::Uuid;

/// Unique identifier of one duplex connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Cloneable sending half of a connection.
///
/// Messages are queued; a writer task owns the socket and drains the queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, tx: mpsc::Sender<String>) -> Self {
        Self { id, tx }
    }

    /// Handle plus the receiving end the writer task drains
    pub fn channel(queue: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(queue.max(1));
        (Self::new(ConnectionId::new(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// True once the writer side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Best-effort send; returns false if the message was not queued
    pub fn send(&self, message: &OutboundMessage) -> bool {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize outbound message: {}", e);
                return false;
            }
        };
        self.send_text(text)
    }

    pub fn send_text(&self, text: String) -> bool {
        match self.tx.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                warn!(
                    "Send queue full for {}, dropping message ({} bytes)",
                    self.id,
                    msg.len()
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// Per-connection state handed to the router on every event
#[derive(Debug)]
pub struct ConnectionContext {
    handle: ConnectionHandle,
    bindings: Vec<(String, Role)>,
}

impl ConnectionContext {
    pub fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            bindings: Vec::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Sessions and roles this connection has claimed, in binding order
    pub fn bindings(&self) -> &[(String, Role)] {
        &self.bindings
    }

    pub fn record_binding(&mut self, code: &str, role: Role) {
        if !self.bindings.iter().any(|(c, r)| c == code && *r == role) {
            self.bindings.push((code.to_string(), role));
        }
    }
}
