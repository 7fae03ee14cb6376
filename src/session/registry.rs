use super::session::Session;
use crate::error::{SessionError, SessionResult};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Source of candidate session codes
pub trait CodeGenerator: Send + Sync {
    fn next_code(&self) -> String;
}

/// Uniform six-digit codes (100000..=999999)
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodes;

impl CodeGenerator for RandomCodes {
    fn next_code(&self) -> String {
        rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
    }
}

/// In-memory table of active sessions keyed by code
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    codes: Box<dyn CodeGenerator>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_generator(RandomCodes)
    }

    pub fn with_generator(codes: impl CodeGenerator + 'static) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            codes: Box::new(codes),
        }
    }

    /// Create a session under a fresh code.
    ///
    /// Generation and insertion happen under one write lock, so two
    /// concurrent allocations can never land on the same code.
    pub async fn allocate(&self) -> String {
        let mut sessions = self.sessions.write().await;

        let code = loop {
            let candidate = self.codes.next_code();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            debug!("Session code {} already in use, retrying", candidate);
        };

        sessions.insert(code.clone(), Arc::new(Session::new(code.clone())));
        info!("New session created with code: {}", code);

        code
    }

    pub async fn lookup(&self, code: &str) -> SessionResult<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(code)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(code.to_string()))
    }

    /// Remove whatever session holds `code`; removing an absent code is a no-op
    pub async fn remove(&self, code: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.write().await.remove(code);
        if removed.is_some() {
            info!("Session {} removed", code);
        }
        removed
    }

    /// Remove `session` only if it is still the entry registered under its code.
    ///
    /// Late cleanup of an old session must not evict a newer session that
    /// was allocated the same code afterwards.
    pub async fn evict(&self, session: &Arc<Session>) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(session.code()) {
            Some(current) if Arc::ptr_eq(current, session) => {
                sessions.remove(session.code());
                info!("Session {} evicted", session.code());
                true
            }
            _ => false,
        }
    }

    pub async fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
