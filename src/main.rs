use anyhow::{Context, Result};
use clap::Parser;
use duet_recorder::{create_router, session, AppState, Config};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet-recorder")]
#[command(about = "Pair a host and a guest and record both sides of the conversation")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/duet-recorder")]
    config: String,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let recordings = &cfg.recording.recordings_path;
    if !recordings.exists() {
        tokio::fs::create_dir_all(recordings)
            .await
            .with_context(|| format!("Failed to create recordings directory {}", recordings.display()))?;
        info!("Created recordings directory: {}", recordings.display());
    }

    let state = AppState::new(&cfg);

    let _sweeper = (cfg.sessions.idle_timeout_secs > 0).then(|| {
        session::spawn_idle_sweeper(
            state.registry.clone(),
            Duration::from_secs(cfg.sessions.idle_timeout_secs),
            Duration::from_secs(cfg.sessions.sweep_interval_secs.max(1)),
        )
    });

    let app = create_router(state, &cfg.recording);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server is listening on {}", addr);
    info!("Recordings directory: {}", recordings.display());

    axum::serve(listener, app).await?;

    Ok(())
}
