use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recording: RecordingConfig,
    pub sessions: SessionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// Directory the per-role recording files are written to
    pub recordings_path: PathBuf,
    /// Directory holding the browser client assets
    pub public_path: PathBuf,
    /// File extension of recordings (the browser sends webm chunks)
    pub extension: String,
    /// URL prefix under which recordings are served back
    pub download_prefix: String,
    /// Delay added to "now" when computing the synchronized start time
    pub start_buffer_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Outbound message queue depth per connection
    pub send_queue: usize,
    /// Evict sessions idle for this long (0 disables expiry)
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "duet-recorder".to_string(),
                http: HttpConfig {
                    bind: "0.0.0.0".to_string(),
                    port: 3000,
                },
            },
            recording: RecordingConfig::default(),
            sessions: SessionsConfig::default(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            recordings_path: PathBuf::from("recordings"),
            public_path: PathBuf::from("public"),
            extension: "webm".to_string(),
            download_prefix: "/recordings".to_string(),
            start_buffer_ms: 1000,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            send_queue: 256,
            idle_timeout_secs: 0,
            sweep_interval_secs: 60,
        }
    }
}

impl Config {
    /// Load defaults, then the optional config file, then `DUET__*` env vars.
    pub fn load(path: &str) -> Result<Self> {
        let defaults = Config::default();

        let settings = config::Config::builder()
            .set_default("service.name", defaults.service.name)?
            .set_default("service.http.bind", defaults.service.http.bind)?
            .set_default("service.http.port", defaults.service.http.port as i64)?
            .set_default(
                "recording.recordings_path",
                defaults.recording.recordings_path.display().to_string(),
            )?
            .set_default(
                "recording.public_path",
                defaults.recording.public_path.display().to_string(),
            )?
            .set_default("recording.extension", defaults.recording.extension)?
            .set_default("recording.download_prefix", defaults.recording.download_prefix)?
            .set_default(
                "recording.start_buffer_ms",
                defaults.recording.start_buffer_ms as i64,
            )?
            .set_default("sessions.send_queue", defaults.sessions.send_queue as i64)?
            .set_default(
                "sessions.idle_timeout_secs",
                defaults.sessions.idle_timeout_secs as i64,
            )?
            .set_default(
                "sessions.sweep_interval_secs",
                defaults.sessions.sweep_interval_secs as i64,
            )?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("DUET").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }
}
