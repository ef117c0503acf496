//! Idle session sweeper.
//!
//! DESIGN
//! ======
//! Documents are retained after the last subscriber leaves so reconnects
//! resume from the latest state, but abandoned sessions must not pile up
//! forever. A background task evicts every session with zero subscribers
//! whose last write is older than a TTL (default 24 hours, overridable
//! via `DECOPAD_SESSION_TTL_SECS`).

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::info;

use crate::state::AppState;

const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
const SWEEP_INTERVAL_SECS: u64 = 60;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the background sweeper. Returns a handle for shutdown.
pub fn spawn_sweep_task(state: AppState) -> JoinHandle<()> {
    let ttl = Duration::from_secs(env_parse("DECOPAD_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS));
    info!(ttl_secs = ttl.as_secs(), "idle session sweeper configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(SWEEP_INTERVAL_SECS)).await;
            sweep_idle_at(&state, ttl, Instant::now()).await;
        }
    })
}

/// Evict idle sessions at an explicit clock reading. A session is idle
/// when it has no subscribers and its last write is at least `ttl` old.
pub(crate) async fn sweep_idle_at(state: &AppState, ttl: Duration, now: Instant) {
    let mut sessions = state.sessions.write().await;
    let expired: Vec<_> = sessions
        .iter()
        .filter(|(_, entry)| {
            entry.subscribers.is_empty() && now.duration_since(entry.last_write) >= ttl
        })
        .map(|(id, _)| id.clone())
        .collect();

    for id in expired {
        sessions.remove(&id);
        info!(session = %id, "idle session evicted");
    }
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod tests;
