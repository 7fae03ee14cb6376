//! Session state transitions.
//!
//! Every transition runs under the session's control lock, so two readiness
//! signals racing on different connections still fire the start exactly once.

use super::role::Role;
use super::session::{SessionControl, SessionState};
use crate::error::{SessionError, SessionResult};
use crate::relay::ConnectionHandle;
use tracing::{debug, info};

/// Result of binding a connection to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The role was vacant (or its previous connection was gone)
    Bound,
    /// The same connection re-announced itself
    AlreadyBound,
}

/// Everything the stop path needs once the control lock is released
#[derive(Debug, Clone)]
pub struct StopPlan {
    pub host: Option<ConnectionHandle>,
    pub guest: Option<ConnectionHandle>,
    /// Roles that had a bound connection at some point
    pub recorded_roles: Vec<Role>,
}

impl SessionControl {
    /// Bind `handle` to `role`.
    ///
    /// A live connection in the slot is never displaced; the slot is only
    /// reused once the previous connection has gone away.
    pub fn bind(
        &mut self,
        code: &str,
        role: Role,
        handle: ConnectionHandle,
    ) -> SessionResult<BindOutcome> {
        if self.state == SessionState::Closed {
            return Err(SessionError::SessionNotFound(code.to_string()));
        }

        if let Some(existing) = self.connections.get(role) {
            if existing.id() == handle.id() {
                return Ok(BindOutcome::AlreadyBound);
            }
            if !existing.is_closed() {
                return Err(SessionError::DuplicateBinding {
                    code: code.to_string(),
                    role,
                });
            }
            debug!("Replacing closed {} connection in session {}", role, code);
        }

        *self.connections.get_mut(role) = Some(handle);
        *self.ever_bound.get_mut(role) = true;

        if self.state == SessionState::Created {
            self.state = SessionState::AwaitingPeer;
        }

        Ok(BindOutcome::Bound)
    }

    /// Clear the role's slot if `handle` still owns it
    pub fn unbind(&mut self, role: Role, handle: &ConnectionHandle) -> bool {
        if self.is_bound_to(role, handle.id()) {
            *self.connections.get_mut(role) = None;
            true
        } else {
            false
        }
    }

    /// Set the readiness flag; returns false if it was already set
    pub fn mark_ready(&mut self, role: Role) -> bool {
        let flag = self.ready.get_mut(role);
        let newly = !*flag;
        *flag = true;
        newly
    }

    /// Fire the `Ready` → `Recording` transition if both roles are ready.
    ///
    /// Returns the synchronized start time (epoch ms) when the transition
    /// happened. Calling it again afterwards is a no-op.
    pub fn evaluate_readiness(&mut self, now_ms: i64, start_buffer_ms: u64) -> Option<i64> {
        match self.state {
            SessionState::Created | SessionState::AwaitingPeer => {}
            _ => return None,
        }

        if !(self.ready.host && self.ready.guest) {
            return None;
        }

        self.state = SessionState::Ready;
        let start_time = now_ms + start_buffer_ms as i64;
        self.state = SessionState::Recording;

        info!("Both roles ready, recording starts at {}", start_time);

        Some(start_time)
    }

    /// Move to `Closed` for an explicit stop.
    ///
    /// Returns `None` when the session was already closed by a concurrent
    /// stop or reconciliation.
    pub fn begin_stop(&mut self) -> Option<StopPlan> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;

        let recorded_roles = self
            .ever_bound
            .iter()
            .filter(|(_, bound)| **bound)
            .map(|(role, _)| role)
            .collect();

        Some(StopPlan {
            host: self.connections.host.take(),
            guest: self.connections.guest.take(),
            recorded_roles,
        })
    }

    /// Close the session for eviction; returns false if it was already closed
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }
}
