use crate::config::Config;
use crate::recording::StreamManager;
use crate::relay::{ConnectionRouter, DisconnectReconciler};
use crate::session::SessionRegistry;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active sessions (code → session)
    pub registry: Arc<SessionRegistry>,

    /// Inbound message dispatch
    pub router: ConnectionRouter,

    /// Cleanup for dropped connections
    pub reconciler: DisconnectReconciler,

    /// Outbound queue depth per connection
    pub send_queue: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config, Arc::new(SessionRegistry::new()))
    }

    pub fn with_registry(config: &Config, registry: Arc<SessionRegistry>) -> Self {
        let streams = Arc::new(StreamManager::new(&config.recording));

        Self {
            router: ConnectionRouter::new(
                Arc::clone(&registry),
                Arc::clone(&streams),
                config.recording.start_buffer_ms,
            ),
            reconciler: DisconnectReconciler::new(Arc::clone(&registry), streams),
            registry,
            send_queue: config.sessions.send_queue,
        }
    }
}
