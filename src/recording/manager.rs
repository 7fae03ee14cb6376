use super::sink::{RoleSink, SinkSlot};
use crate::config::RecordingConfig;
use crate::error::{SessionError, SessionResult};
use crate::session::{Role, Session};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Outcome of a write request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(usize),
    /// No open sink for the role
    Dropped,
}

/// Result of closing all sinks of a session
#[derive(Debug, Default)]
pub struct CloseSummary {
    /// Sinks that were open and finalized cleanly
    pub closed: usize,
    pub failures: Vec<(Role, SessionError)>,
}

/// Opens, feeds and finalizes the per-role recording files of sessions
#[derive(Debug, Clone)]
pub struct StreamManager {
    recordings_dir: PathBuf,
    extension: String,
    download_prefix: String,
}

impl StreamManager {
    pub fn new(config: &RecordingConfig) -> Self {
        Self {
            recordings_dir: config.recordings_path.clone(),
            extension: config.extension.clone(),
            download_prefix: config.download_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn recordings_dir(&self) -> &PathBuf {
        &self.recordings_dir
    }

    /// `recording-<code>-<role>.<ext>`
    pub fn file_name(&self, code: &str, role: Role) -> String {
        format!("recording-{}-{}.{}", code, role, self.extension)
    }

    pub fn file_path(&self, code: &str, role: Role) -> PathBuf {
        self.recordings_dir.join(self.file_name(code, role))
    }

    pub fn download_url(&self, code: &str, role: Role) -> String {
        format!("{}/{}", self.download_prefix, self.file_name(code, role))
    }

    /// Open the role's sink if it was never opened.
    ///
    /// Returns `Ok(true)` when a file was created, `Ok(false)` when the slot
    /// was already open, closed or failed.
    pub async fn open(&self, session: &Session, role: Role) -> SessionResult<bool> {
        let mut slot = session.sink(role).lock().await;
        if !matches!(*slot, SinkSlot::Absent) {
            debug!("{} sink for session {} already {:?}", role, session.code(), slot.state());
            return Ok(false);
        }

        let path = self.file_path(session.code(), role);
        match RoleSink::create(&path).await {
            Ok(sink) => {
                info!("Opened {} sink for session {}: {}", role, session.code(), path.display());
                *slot = SinkSlot::Open(sink);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to open {} sink {}: {}", role, path.display(), e);
                *slot = SinkSlot::Failed;
                Err(SessionError::SinkWrite {
                    code: session.code().to_string(),
                    role,
                    source: e,
                })
            }
        }
    }

    /// Append bytes to the role's sink; silently dropped if it is not open.
    ///
    /// A failed write marks the slot `Failed` so later writes are dropped too.
    pub async fn write(
        &self,
        session: &Session,
        role: Role,
        bytes: &[u8],
    ) -> SessionResult<WriteOutcome> {
        let mut slot = session.sink(role).lock().await;
        let sink = match &mut *slot {
            SinkSlot::Open(sink) => sink,
            other => {
                debug!(
                    "Dropping {} bytes of {} audio for session {} (sink {:?})",
                    bytes.len(),
                    role,
                    session.code(),
                    other.state()
                );
                return Ok(WriteOutcome::Dropped);
            }
        };

        match sink.write(bytes).await {
            Ok(()) => Ok(WriteOutcome::Written(bytes.len())),
            Err(e) => {
                error!("Write to {} sink of session {} failed: {}", role, session.code(), e);
                *slot = SinkSlot::Failed;
                Err(SessionError::SinkWrite {
                    code: session.code().to_string(),
                    role,
                    source: e,
                })
            }
        }
    }

    /// Finalize the role's sink. Returns `Ok(true)` if an open sink was closed.
    ///
    /// A never-opened slot is sealed so it cannot be opened later. A sink
    /// that fails to finalize ends up `Failed` and the error is returned.
    pub async fn close(&self, session: &Session, role: Role) -> SessionResult<bool> {
        let mut slot = session.sink(role).lock().await;
        match std::mem::replace(&mut *slot, SinkSlot::Failed) {
            SinkSlot::Open(sink) => {
                let path = sink.path().to_path_buf();
                match sink.finish().await {
                    Ok(bytes_written) => {
                        info!(
                            "Closed {} sink for session {} ({} bytes)",
                            role,
                            session.code(),
                            bytes_written
                        );
                        *slot = SinkSlot::Closed { bytes_written };
                        Ok(true)
                    }
                    Err(e) => {
                        error!("Failed to finalize {}: {}", path.display(), e);
                        Err(SessionError::SinkWrite {
                            code: session.code().to_string(),
                            role,
                            source: e,
                        })
                    }
                }
            }
            SinkSlot::Absent => {
                *slot = SinkSlot::Closed { bytes_written: 0 };
                Ok(false)
            }
            previous => {
                *slot = previous;
                Ok(false)
            }
        }
    }

    /// Close every sink of the session, continuing past failures
    pub async fn close_all(&self, session: &Session) -> CloseSummary {
        let mut summary = CloseSummary::default();
        for role in Role::ALL {
            match self.close(session, role).await {
                Ok(true) => summary.closed += 1,
                Ok(false) => {}
                Err(e) => summary.failures.push((role, e)),
            }
        }
        summary
    }
}
