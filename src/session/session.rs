use super::role::{PerRole, Role};
use super::stats::SessionSnapshot;
use crate::recording::SinkSlot;
use crate::relay::{ConnectionHandle, ConnectionId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::{Mutex, MutexGuard};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Code allocated, nobody connected yet
    Created,
    /// At least one role bound, waiting for both to signal readiness
    AwaitingPeer,
    /// Both roles ready; only ever observed inside the readiness transition
    Ready,
    /// Start signal sent, sinks open
    Recording,
    /// Stopped or reconciled away; the registry entry is gone or going
    Closed,
}

/// Mutable role bookkeeping of a session, guarded by one lock per session
#[derive(Debug)]
pub struct SessionControl {
    pub(crate) state: SessionState,
    pub(crate) connections: PerRole<Option<ConnectionHandle>>,
    pub(crate) ever_bound: PerRole<bool>,
    pub(crate) ready: PerRole<bool>,
    pub(crate) degraded: bool,
    pub(crate) last_activity: Instant,
}

impl SessionControl {
    fn new() -> Self {
        Self {
            state: SessionState::Created,
            connections: PerRole::default(),
            ever_bound: PerRole::default(),
            ready: PerRole::default(),
            degraded: false,
            last_activity: Instant::now(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self, role: Role) -> bool {
        *self.ready.get(role)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn mark_degraded(&mut self) {
        self.degraded = true;
    }

    pub fn connection(&self, role: Role) -> Option<&ConnectionHandle> {
        self.connections.get(role).as_ref()
    }

    pub fn is_bound_to(&self, role: Role, id: ConnectionId) -> bool {
        self.connection(role).map(|c| c.id() == id).unwrap_or(false)
    }

    pub fn has_bound_connection(&self) -> bool {
        self.connections.iter().any(|(_, c)| c.is_some())
    }

    pub fn bound_handles(&self) -> Vec<ConnectionHandle> {
        self.connections
            .iter()
            .filter_map(|(_, c)| c.clone())
            .collect()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// A paired recording session between a host and a guest
pub struct Session {
    code: String,
    created_at: DateTime<Utc>,
    control: Mutex<SessionControl>,
    sinks: PerRole<Mutex<SinkSlot>>,
}

impl Session {
    pub fn new(code: String) -> Self {
        Self {
            code,
            created_at: Utc::now(),
            control: Mutex::new(SessionControl::new()),
            sinks: PerRole::new(Mutex::new(SinkSlot::Absent), Mutex::new(SinkSlot::Absent)),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lock the role/readiness bookkeeping.
    ///
    /// Lock order is control before sink; never take this while a sink is held.
    pub async fn control(&self) -> MutexGuard<'_, SessionControl> {
        self.control.lock().await
    }

    pub fn sink(&self, role: Role) -> &Mutex<SinkSlot> {
        self.sinks.get(role)
    }

    pub async fn has_open_sink(&self) -> bool {
        for role in Role::ALL {
            if self.sink(role).lock().await.is_open() {
                return true;
            }
        }
        false
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let (state, connected, ready, degraded) = {
            let control = self.control().await;
            (
                control.state,
                PerRole::new(
                    control.connections.host.is_some(),
                    control.connections.guest.is_some(),
                ),
                control.ready.clone(),
                control.degraded,
            )
        };

        let sinks = PerRole::new(
            self.sink(Role::Host).lock().await.state(),
            self.sink(Role::Guest).lock().await.state(),
        );

        SessionSnapshot {
            code: self.code.clone(),
            state,
            created_at: self.created_at,
            connected,
            ready,
            sinks,
            degraded,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("code", &self.code)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
