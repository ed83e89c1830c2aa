//! In-crate store double for exercising the lock manager and guard without a
//! backend crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{LatchError, Result};
use crate::key::ensure_key;
use crate::lifecycle::{Connectable, Lifecycle, DEFAULT_HEALTH_TIMEOUT};
use crate::store::AtomicStore;

#[derive(Default)]
pub struct CountingStore {
    lifecycle: Lifecycle,
    entries: Mutex<HashMap<String, Instant>>,
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
    last_ttl: Mutex<Option<Duration>>,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn connected() -> Arc<Self> {
        let store = Self::new();
        store.connect().await.unwrap();
        store
    }

    /// Make every following store call fail with `BackendUnavailable`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Number of store operations that reached the backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_ttl(&self) -> Option<Duration> {
        *self.last_ttl.lock().unwrap()
    }

    async fn enter(&self, key: &str) -> Result<()> {
        ensure_key(key)?;
        self.lifecycle.ensure_connected()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(LatchError::BackendUnavailable(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Connectable for CountingStore {
    async fn connect(&self) -> Result<()> {
        self.lifecycle.connect(|| async { Ok(()) }).await
    }

    async fn disconnect(&self) -> Result<()> {
        self.lifecycle.disconnect(|| async { Ok(()) }).await
    }

    async fn readiness(&self) -> Result<()> {
        self.lifecycle
            .check_health(DEFAULT_HEALTH_TIMEOUT, || async { Ok(()) })
            .await
    }

    async fn liveness(&self) -> Result<()> {
        self.readiness().await
    }
}

#[async_trait]
impl AtomicStore for CountingStore {
    fn backend(&self) -> &'static str {
        "counting"
    }

    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.enter(key).await?;
        *self.last_ttl.lock().unwrap() = Some(ttl);

        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(expires_at) if *expires_at > now => Ok(false),
            _ => {
                entries.insert(key.to_string(), now + ttl);
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str) -> Result<bool> {
        self.enter(key).await?;
        let now = Instant::now();
        let removed = self.entries.lock().unwrap().remove(key);
        Ok(removed.is_some_and(|expires_at| expires_at > now))
    }

    async fn exists(&self, key: &str) -> bool {
        if self.enter(key).await.is_err() {
            return false;
        }
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|expires_at| *expires_at > now)
    }
}
