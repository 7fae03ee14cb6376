use super::registry::SessionRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::info;

/// Evict sessions with no bound connection, no open sink and no activity
/// since `now - idle_timeout`. Returns the number evicted.
pub async fn sweep_idle(registry: &SessionRegistry, idle_timeout: Duration, now: Instant) -> usize {
    let mut evicted = 0;

    for session in registry.sessions().await {
        let expired = {
            let mut control = session.control().await;
            let idle_for = now.saturating_duration_since(control.last_activity());
            if control.has_bound_connection()
                || idle_for < idle_timeout
                || session.has_open_sink().await
            {
                false
            } else {
                control.close()
            }
        };

        if expired && registry.evict(&session).await {
            info!("Session {} expired after {:?} idle", session.code(), idle_timeout);
            evicted += 1;
        }
    }

    evicted
}

/// Run [`sweep_idle`] every `interval` until the task is dropped
pub fn spawn_idle_sweeper(
    registry: Arc<SessionRegistry>,
    idle_timeout: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Idle session sweeper started (timeout {:?}, every {:?})",
            idle_timeout, interval
        );

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sweep_idle(&registry, idle_timeout, Instant::now()).await;
        }
    })
}
