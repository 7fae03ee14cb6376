use super::connection::ConnectionContext;
use super::messages::{Action, InboundMessage, OutboundMessage};
use crate::error::{SessionError, SessionResult};
use crate::recording::{SinkState, StreamManager};
use crate::session::{BindOutcome, Role, Session, SessionRegistry};
use base64::Engine;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dispatches inbound messages to their session and routes the resulting
/// notifications to the bound participants
#[derive(Clone)]
pub struct ConnectionRouter {
    registry: Arc<SessionRegistry>,
    streams: Arc<StreamManager>,
    start_buffer_ms: u64,
}

impl ConnectionRouter {
    pub fn new(
        registry: Arc<SessionRegistry>,
        streams: Arc<StreamManager>,
        start_buffer_ms: u64,
    ) -> Self {
        Self {
            registry,
            streams,
            start_buffer_ms,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn streams(&self) -> &Arc<StreamManager> {
        &self.streams
    }

    /// Handle one text frame; any failure is reported to the sender only
    pub async fn handle_text(&self, ctx: &mut ConnectionContext, text: &str) {
        if let Err(e) = self.dispatch(ctx, text).await {
            match &e {
                SessionError::SessionNotFound(code) => {
                    debug!("{} referenced unknown session {}", ctx.id(), code)
                }
                other => warn!("Rejected message from {}: {}", ctx.id(), other),
            }
            ctx.handle().send(&OutboundMessage::error(e.to_string()));
        }
    }

    pub async fn dispatch(&self, ctx: &mut ConnectionContext, text: &str) -> SessionResult<()> {
        let message = InboundMessage::parse(text)?;
        let session = self.registry.lookup(message.code()).await?;

        match message.action() {
            Action::Connect(role) => self.connect(ctx, &session, role).await,
            Action::Ready(role) => self.ready(&session, role).await,
            Action::Audio(role, data) => self.audio(ctx, &session, role, data).await,
            Action::Stop => self.stop(&session).await,
        }
    }

    async fn connect(
        &self,
        ctx: &mut ConnectionContext,
        session: &Arc<Session>,
        role: Role,
    ) -> SessionResult<()> {
        let outcome = {
            let mut control = session.control().await;
            control.touch();
            control.bind(session.code(), role, ctx.handle().clone())?
        };

        ctx.record_binding(session.code(), role);
        if outcome == BindOutcome::Bound {
            info!("{} connected to session: {}", capitalize(role), session.code());
        }
        Ok(())
    }

    async fn ready(&self, session: &Arc<Session>, role: Role) -> SessionResult<()> {
        let mut control = session.control().await;
        control.touch();

        if control.mark_ready(role) {
            info!("{} is ready for session: {}", capitalize(role), session.code());
        }

        let Some(start_time) =
            control.evaluate_readiness(Utc::now().timestamp_millis(), self.start_buffer_ms)
        else {
            return Ok(());
        };

        info!("Starting recording for session: {}", session.code());

        // Sinks open before anyone is told to start so the first chunk
        // never arrives ahead of its file.
        for sink_role in Role::ALL {
            if let Err(e) = self.streams.open(session, sink_role).await {
                control.mark_degraded();
                if let Some(conn) = control.connection(sink_role) {
                    conn.send(&OutboundMessage::error(e.to_string()));
                }
            }
        }

        let recipients = control.bound_handles();
        drop(control);

        let start = OutboundMessage::StartSession { start_time };
        for conn in &recipients {
            conn.send(&start);
        }

        Ok(())
    }

    async fn audio(
        &self,
        ctx: &ConnectionContext,
        session: &Arc<Session>,
        role: Role,
        data: &str,
    ) -> SessionResult<()> {
        {
            let mut control = session.control().await;
            if !control.is_bound_to(role, ctx.id()) {
                debug!(
                    "Ignoring {} audio for session {} from unbound {}",
                    role,
                    session.code(),
                    ctx.id()
                );
                return Ok(());
            }
            control.touch();
        }

        if !session.sink(role).lock().await.is_open() {
            debug!("No open {} sink for session {}, ignoring audio", role, session.code());
            return Ok(());
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| SessionError::Protocol(format!("audioData is not valid base64: {}", e)))?;

        if let Err(e) = self.streams.write(session, role, &bytes).await {
            session.control().await.mark_degraded();
            return Err(e);
        }
        Ok(())
    }

    async fn stop(&self, session: &Arc<Session>) -> SessionResult<()> {
        let Some(plan) = session.control().await.begin_stop() else {
            debug!("Session {} already closed", session.code());
            return Ok(());
        };

        info!("Stopping recording for session: {}", session.code());

        let summary = self.streams.close_all(session).await;
        if !summary.failures.is_empty() {
            session.control().await.mark_degraded();
        }
        for (role, e) in &summary.failures {
            let conn = match role {
                Role::Host => &plan.host,
                Role::Guest => &plan.guest,
            };
            if let Some(conn) = conn {
                conn.send(&OutboundMessage::error(e.to_string()));
            }
        }

        // Files that failed along the way are not offered for download
        let mut download_urls = Vec::new();
        for role in &plan.recorded_roles {
            if session.sink(*role).lock().await.state() != SinkState::Failed {
                download_urls.push(self.streams.download_url(session.code(), *role));
            }
        }

        if let Some(host) = &plan.host {
            host.send(&OutboundMessage::RecordingSaved {
                download_urls: Some(download_urls),
            });
        }
        if let Some(guest) = &plan.guest {
            guest.send(&OutboundMessage::RecordingSaved {
                download_urls: None,
            });
        }

        self.registry.evict(session).await;
        Ok(())
    }
}

fn capitalize(role: Role) -> &'static str {
    match role {
        Role::Host => "Host",
        Role::Guest => "Guest",
    }
}
