use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Externally visible state of a role's sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkState {
    Absent,
    Open,
    Closed,
    Failed,
}

/// One role's sink slot.
///
/// Moves `Absent → Open → Closed` at most once. `Absent → Closed` seals a
/// slot that was never opened; `Failed` is terminal after a storage error.
#[derive(Debug)]
pub enum SinkSlot {
    Absent,
    Open(RoleSink),
    Closed { bytes_written: u64 },
    Failed,
}

impl SinkSlot {
    pub fn state(&self) -> SinkState {
        match self {
            SinkSlot::Absent => SinkState::Absent,
            SinkSlot::Open(_) => SinkState::Open,
            SinkSlot::Closed { .. } => SinkState::Closed,
            SinkSlot::Failed => SinkState::Failed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SinkSlot::Open(_))
    }
}

/// Append-only file receiving one role's audio bytes.
///
/// Every chunk is flushed to the file before `write` returns, so storage
/// errors surface on the write that caused them.
#[derive(Debug)]
pub struct RoleSink {
    path: PathBuf,
    file: File,
    bytes_written: u64,
}

impl RoleSink {
    /// Create (or truncate) the backing file
    pub async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file,
            bytes_written: 0,
        })
    }

    pub async fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes).await?;
        self.file.flush().await?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush everything to disk and release the file
    pub async fn finish(mut self) -> std::io::Result<u64> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.bytes_written)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
