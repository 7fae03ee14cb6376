// Integration tests for per-role sink management
//
// These tests verify that each role's recording file is opened at most once,
// closed at most once and never written after closing.

use anyhow::Result;
use duet_recorder::config::RecordingConfig;
use duet_recorder::recording::{RoleSink, SinkSlot};
use duet_recorder::{Role, Session, SinkState, StreamManager, WriteOutcome};
use std::fs;
use tempfile::TempDir;

fn manager(dir: &TempDir) -> StreamManager {
    StreamManager::new(&RecordingConfig {
        recordings_path: dir.path().to_path_buf(),
        ..RecordingConfig::default()
    })
}

async fn sink_state(session: &Session, role: Role) -> SinkState {
    session.sink(role).lock().await.state()
}

#[test]
fn test_file_names_and_download_urls() {
    let temp_dir = TempDir::new().unwrap();
    let streams = manager(&temp_dir);

    assert_eq!(streams.file_name("482913", Role::Host), "recording-482913-host.webm");
    assert_eq!(streams.file_name("482913", Role::Guest), "recording-482913-guest.webm");
    assert_eq!(
        streams.download_url("482913", Role::Guest),
        "/recordings/recording-482913-guest.webm"
    );
    assert_eq!(
        streams.file_path("482913", Role::Host),
        temp_dir.path().join("recording-482913-host.webm")
    );
}

#[test]
fn test_custom_extension_and_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let streams = StreamManager::new(&RecordingConfig {
        recordings_path: temp_dir.path().to_path_buf(),
        extension: "ogg".to_string(),
        download_prefix: "/files/".to_string(),
        ..RecordingConfig::default()
    });

    assert_eq!(
        streams.download_url("100200", Role::Host),
        "/files/recording-100200-host.ogg"
    );
}

#[tokio::test]
async fn test_open_write_close_lifecycle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("482913".to_string());

    assert_eq!(sink_state(&session, Role::Host).await, SinkState::Absent);
    assert!(streams.open(&session, Role::Host).await?);
    assert!(!streams.open(&session, Role::Host).await?, "Second open is a no-op");
    assert_eq!(sink_state(&session, Role::Host).await, SinkState::Open);

    assert_eq!(
        streams.write(&session, Role::Host, &[0, 0]).await?,
        WriteOutcome::Written(2)
    );
    assert_eq!(
        streams.write(&session, Role::Host, &[7, 8, 9]).await?,
        WriteOutcome::Written(3)
    );

    assert!(streams.close(&session, Role::Host).await?);
    assert_eq!(sink_state(&session, Role::Host).await, SinkState::Closed);

    let contents = fs::read(streams.file_path("482913", Role::Host))?;
    assert_eq!(contents, vec![0, 0, 7, 8, 9]);

    Ok(())
}

#[tokio::test]
async fn test_closed_sink_is_never_written_or_reopened() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("100200".to_string());

    streams.open(&session, Role::Guest).await?;
    streams.write(&session, Role::Guest, b"abc").await?;
    assert!(streams.close(&session, Role::Guest).await?);

    assert_eq!(
        streams.write(&session, Role::Guest, b"late").await?,
        WriteOutcome::Dropped
    );
    assert!(!streams.open(&session, Role::Guest).await?);
    assert!(!streams.close(&session, Role::Guest).await?, "Closing twice is a no-op");

    let contents = fs::read(streams.file_path("100200", Role::Guest))?;
    assert_eq!(contents, b"abc");
    Ok(())
}

#[tokio::test]
async fn test_write_without_sink_is_dropped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("555555".to_string());

    assert_eq!(
        streams.write(&session, Role::Host, &[1, 2, 3]).await?,
        WriteOutcome::Dropped
    );
    assert!(!streams.file_path("555555", Role::Host).exists());
    Ok(())
}

#[tokio::test]
async fn test_closing_unopened_sink_seals_it() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("606060".to_string());

    assert!(!streams.close(&session, Role::Host).await?);
    assert_eq!(sink_state(&session, Role::Host).await, SinkState::Closed);
    assert!(!streams.open(&session, Role::Host).await?);
    assert!(!streams.file_path("606060", Role::Host).exists());
    Ok(())
}

#[tokio::test]
async fn test_close_all_only_counts_open_sinks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("707070".to_string());

    streams.open(&session, Role::Host).await?;
    let summary = streams.close_all(&session).await;
    assert_eq!(summary.closed, 1);
    assert!(summary.failures.is_empty());
    assert_eq!(streams.close_all(&session).await.closed, 0);
    assert!(!session.has_open_sink().await);
    Ok(())
}

#[tokio::test]
async fn test_open_truncates_stale_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let path = streams.file_path("808080", Role::Host);
    fs::write(&path, b"left over from an earlier session")?;

    let session = Session::new("808080".to_string());
    streams.open(&session, Role::Host).await?;
    streams.write(&session, Role::Host, b"new").await?;
    streams.close(&session, Role::Host).await?;

    assert_eq!(fs::read(&path)?, b"new");
    Ok(())
}

#[tokio::test]
async fn test_open_failure_marks_sink_failed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = StreamManager::new(&RecordingConfig {
        recordings_path: temp_dir.path().join("does-not-exist"),
        ..RecordingConfig::default()
    });
    let session = Session::new("909090".to_string());

    let err = streams.open(&session, Role::Guest).await.unwrap_err();
    assert!(err.to_string().contains("guest audio for session 909090"));
    assert_eq!(sink_state(&session, Role::Guest).await, SinkState::Failed);

    assert_eq!(
        streams.write(&session, Role::Guest, &[1]).await?,
        WriteOutcome::Dropped
    );
    assert!(!streams.close(&session, Role::Guest).await?);
    Ok(())
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_write_failure_surfaces_on_the_failing_write() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("313131".to_string());
    *session.sink(Role::Host).lock().await = SinkSlot::Open(RoleSink::create("/dev/full").await?);

    let err = streams
        .write(&session, Role::Host, b"AAAAAAAA")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("host audio for session 313131"));
    assert_eq!(sink_state(&session, Role::Host).await, SinkState::Failed);

    assert_eq!(
        streams.write(&session, Role::Host, b"AAAAAAAA").await?,
        WriteOutcome::Dropped
    );
    assert!(!streams.close(&session, Role::Host).await?);
    Ok(())
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_finish_failure_is_returned_from_close() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let streams = manager(&temp_dir);
    let session = Session::new("323232".to_string());
    // Nothing written, so only the final sync can fail
    *session.sink(Role::Guest).lock().await = SinkSlot::Open(RoleSink::create("/dev/full").await?);

    let summary = streams.close_all(&session).await;
    assert_eq!(summary.closed, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, Role::Guest);
    assert_eq!(sink_state(&session, Role::Guest).await, SinkState::Failed);
    Ok(())
}
