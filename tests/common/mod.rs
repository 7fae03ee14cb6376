// Shared fixtures for the relay integration tests
//
// Clients are plain connection handles whose outbound queue the test reads
// directly, standing in for WebSocket connections.

#![allow(dead_code)]

use anyhow::Result;
use duet_recorder::session::{CodeGenerator, RandomCodes};
use duet_recorder::{
    Config, ConnectionContext, ConnectionHandle, ConnectionRouter, DisconnectReconciler,
    SessionRegistry, StreamManager,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Hands out the given codes first, then random ones
pub struct FixedCodes(Mutex<VecDeque<String>>);

impl FixedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self(Mutex::new(codes.iter().map(|c| c.to_string()).collect()))
    }
}

impl CodeGenerator for FixedCodes {
    fn next_code(&self) -> String {
        let next = self.0.lock().unwrap().pop_front();
        next.unwrap_or_else(|| RandomCodes.next_code())
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub config: Config,
    pub registry: Arc<SessionRegistry>,
    pub streams: Arc<StreamManager>,
    pub router: ConnectionRouter,
    pub reconciler: DisconnectReconciler,
}

impl Harness {
    pub fn new(codes: &[&str]) -> Result<Self> {
        let dir = TempDir::new()?;
        let mut config = Config::default();
        config.recording.recordings_path = dir.path().to_path_buf();
        Ok(Self::with_config(dir, config, codes))
    }

    pub fn with_config(dir: TempDir, config: Config, codes: &[&str]) -> Self {
        let registry = Arc::new(SessionRegistry::with_generator(FixedCodes::new(codes)));
        let streams = Arc::new(StreamManager::new(&config.recording));
        let router = ConnectionRouter::new(
            Arc::clone(&registry),
            Arc::clone(&streams),
            config.recording.start_buffer_ms,
        );
        let reconciler = DisconnectReconciler::new(Arc::clone(&registry), Arc::clone(&streams));

        Self {
            dir,
            config,
            registry,
            streams,
            router,
            reconciler,
        }
    }

    pub fn recording_path(&self, code: &str, role: &str) -> std::path::PathBuf {
        self.dir
            .path()
            .join(format!("recording-{}-{}.webm", code, role))
    }
}

pub struct Client {
    pub ctx: ConnectionContext,
    pub rx: mpsc::Receiver<String>,
}

impl Client {
    pub fn new() -> Self {
        let (handle, rx) = ConnectionHandle::channel(64);
        Self {
            ctx: ConnectionContext::new(handle),
            rx,
        }
    }

    pub async fn send(&mut self, router: &ConnectionRouter, message: Value) {
        router.handle_text(&mut self.ctx, &message.to_string()).await;
    }

    pub async fn send_raw(&mut self, router: &ConnectionRouter, text: &str) {
        router.handle_text(&mut self.ctx, text).await;
    }

    /// Everything queued for this client so far
    pub fn drain(&mut self) -> Vec<Value> {
        let mut received = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            received.push(serde_json::from_str(&text).expect("outbound message is JSON"));
        }
        received
    }
}
