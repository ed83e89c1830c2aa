use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Remove every expired entry. Returns how many were removed.
pub(crate) fn sweep_expired(entries: &DashMap<String, Instant>) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, expires_at| *expires_at > now);
    before.saturating_sub(entries.len())
}

/// Background task reclaiming entries that expired and were never touched
/// again. Expiry is already enforced on the acquire path; the sweep only
/// bounds memory.
pub(crate) struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub(crate) fn spawn(entries: Arc<DashMap<String, Instant>>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = sweep_expired(&entries);
                        if removed > 0 {
                            debug!("Swept {} expired entries ({} remaining)", removed, entries.len());
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Expiry sweep stopped");
        });

        debug!("Expiry sweep started (interval {:?})", interval);
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the task to stop and wait for it.
    pub(crate) async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("Expiry sweep task ended abnormally: {}", e);
        }
    }
}
