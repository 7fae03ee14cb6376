use super::connection::ConnectionContext;
use super::messages::OutboundMessage;
use crate::recording::StreamManager;
use crate::session::{Role, SessionRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cleans up after a connection that went away without a stop
#[derive(Clone)]
pub struct DisconnectReconciler {
    registry: Arc<SessionRegistry>,
    streams: Arc<StreamManager>,
}

impl DisconnectReconciler {
    pub fn new(registry: Arc<SessionRegistry>, streams: Arc<StreamManager>) -> Self {
        Self { registry, streams }
    }

    /// Reconcile every session role the closed connection still owns.
    ///
    /// Ownership is confirmed against the registry, so a binding that was
    /// already released by a stop is skipped. Returns the number of roles
    /// reconciled.
    pub async fn reconcile(&self, ctx: &ConnectionContext) -> usize {
        let mut reconciled = 0;
        for (code, role) in ctx.bindings() {
            if self.reconcile_role(ctx, code, *role).await {
                reconciled += 1;
            }
        }

        if reconciled == 0 {
            debug!("{} closed without owning any session role", ctx.id());
        }
        reconciled
    }

    async fn reconcile_role(&self, ctx: &ConnectionContext, code: &str, role: Role) -> bool {
        let Ok(session) = self.registry.lookup(code).await else {
            return false;
        };

        let peer = {
            let mut control = session.control().await;
            if !control.unbind(role, ctx.handle()) {
                return false;
            }
            control.connection(role.peer()).cloned()
        };

        info!(
            "{} disconnected unexpectedly. Ending file stream for session: {}",
            role, code
        );
        if let Err(e) = self.streams.close(&session, role).await {
            warn!("{}", e);
            session.control().await.mark_degraded();
        }

        if let Some(peer) = peer {
            peer.send(&OutboundMessage::RecordingEnded);
        }

        let evict = {
            let mut control = session.control().await;
            !session.has_open_sink().await && control.close()
        };

        if evict {
            self.registry.evict(&session).await;
        } else {
            debug!("Session {} kept alive, peer sink still open", code);
        }

        true
    }
}
