use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use latch_core::{
    ensure_key, ensure_ttl, AtomicStore, BackendKind, Config, Connectable, LatchError,
    Lifecycle, Result,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::sweep::{sweep_expired, Sweeper};

/// In-process [`AtomicStore`] backed by a concurrent map of expiry instants.
///
/// Check-and-set for a key runs under the map's shard lock for that key, so
/// `try_acquire` is atomic per key. Expiry is checked lazily on every
/// operation; an optional periodic sweep reclaims keys that are never
/// touched again.
///
/// Disconnecting drops every entry.
pub struct MemoryStore {
    lifecycle: Lifecycle,
    entries: Arc<DashMap<String, Instant>>,
    sweep_interval: Option<Duration>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store without a background sweep.
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            entries: Arc::new(DashMap::new()),
            sweep_interval: None,
            sweeper: Mutex::new(None),
        }
    }

    /// Build a store from a validated `memory://` configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.backend_kind()? != BackendKind::Memory {
            return Err(LatchError::ConfigInvalid(format!(
                "memory store cannot serve uri {}",
                config.uri
            )));
        }

        let store = Self::new();
        Ok(match config.sweep_interval {
            Some(interval) => store.with_sweep_interval(interval),
            None => store,
        })
    }

    /// Run an expiry sweep every `interval` while connected.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Number of entries held, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reclaim expired entries now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        sweep_expired(&self.entries)
    }
}

#[async_trait]
impl Connectable for MemoryStore {
    async fn connect(&self) -> Result<()> {
        self.lifecycle
            .connect(move || async move {
                if let Some(interval) = self.sweep_interval {
                    let sweeper = Sweeper::spawn(self.entries.clone(), interval);
                    *self.sweeper.lock().await = Some(sweeper);
                }
                Ok(())
            })
            .await
    }

    async fn disconnect(&self) -> Result<()> {
        self.lifecycle
            .disconnect(move || async move {
                if let Some(sweeper) = self.sweeper.lock().await.take() {
                    sweeper.stop().await;
                }
                let dropped = self.entries.len();
                self.entries.clear();
                debug!("Memory store closed ({} entries dropped)", dropped);
                Ok(())
            })
            .await
    }

    async fn readiness(&self) -> Result<()> {
        self.lifecycle
            .check_health(latch_core::DEFAULT_HEALTH_TIMEOUT, || async { Ok(()) })
            .await
    }

    async fn liveness(&self) -> Result<()> {
        self.readiness().await
    }
}

#[async_trait]
impl AtomicStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self), level = "debug")]
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        ensure_key(key)?;
        ensure_ttl(ttl)?;
        self.lifecycle.ensure_connected()?;

        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            LatchError::ConfigInvalid(format!("ttl {:?} overflows the clock", ttl))
        })?;
        let acquired = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    false
                } else {
                    // Expired entry, take it over
                    entry.insert(expires_at);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        };

        debug!("try_acquire {} -> {}", key, acquired);
        Ok(acquired)
    }

    #[instrument(skip(self), level = "debug")]
    async fn release(&self, key: &str) -> Result<bool> {
        ensure_key(key)?;
        self.lifecycle.ensure_connected()?;

        let now = Instant::now();
        // An expired entry is removed but reported as already absent
        let released = self
            .entries
            .remove(key)
            .is_some_and(|(_, expires_at)| expires_at > now);

        debug!("release {} -> {}", key, released);
        Ok(released)
    }

    async fn exists(&self, key: &str) -> bool {
        if key.is_empty() || self.lifecycle.ensure_connected().is_err() {
            return false;
        }

        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|expires_at| *expires_at > now)
    }
}
