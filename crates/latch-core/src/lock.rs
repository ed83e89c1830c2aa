use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{LatchError, Result};
use crate::key::{KeyCodec, LOCK_NAMESPACE};
use crate::lifecycle::Connectable;
use crate::store::AtomicStore;

/// Distributed lock manager over an [`AtomicStore`].
///
/// The manager is a factory: it binds one shared store and a namespace,
/// and hands out cheap per-key [`Locker`] handles.
///
/// Locks are TTL-bound. A crashed holder's lock frees itself once the TTL
/// elapses, so the TTL must cover the critical section.
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn AtomicStore>,
    codec: KeyCodec,
    default_ttl: Duration,
}

impl LockManager {
    /// Create a lock manager in the default `dlm` namespace.
    pub fn new(store: Arc<dyn AtomicStore>, default_ttl: Duration) -> Self {
        Self::with_namespace(store, LOCK_NAMESPACE, default_ttl)
    }

    pub fn with_namespace(
        store: Arc<dyn AtomicStore>,
        namespace: impl Into<String>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            store,
            codec: KeyCodec::new(namespace),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Bind `key` to a lock handle using the default TTL.
    pub fn locker(&self, key: impl Into<String>) -> Locker {
        Locker {
            store: self.store.clone(),
            codec: self.codec.clone(),
            key: key.into(),
            ttl: self.default_ttl,
        }
    }
}

#[async_trait]
impl Connectable for LockManager {
    async fn connect(&self) -> Result<()> {
        self.store.connect().await
    }

    async fn disconnect(&self) -> Result<()> {
        self.store.disconnect().await
    }

    async fn readiness(&self) -> Result<()> {
        self.store.readiness().await
    }

    async fn liveness(&self) -> Result<()> {
        self.store.liveness().await
    }
}

/// Handle for one lock key.
///
/// Handles are reusable: `lock`, `unlock`, `lock` again on the same handle
/// is the normal cycle.
#[derive(Clone)]
pub struct Locker {
    store: Arc<dyn AtomicStore>,
    codec: KeyCodec,
    key: String,
    ttl: Duration,
}

impl std::fmt::Debug for Locker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locker")
            .field("backend", &self.store.backend())
            .field("namespace", &self.codec.prefix())
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Locker {
    /// Override the TTL for this handle.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Raw (un-namespaced) key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Acquire the lock.
    ///
    /// Fails with [`LatchError::AlreadyLocked`] if a live lock exists. There is
    /// no waiting: retry and backoff are the caller's decision.
    #[instrument(skip(self), fields(key = %self.key, ttl = ?self.ttl), level = "debug")]
    pub async fn lock(&self) -> Result<()> {
        let key = self.codec.key(&self.key)?;

        if !self.store.try_acquire(&key, self.ttl).await? {
            debug!("Lock {} is held elsewhere", key);
            return Err(LatchError::AlreadyLocked(key));
        }

        debug!("Locked {} for {:?}", key, self.ttl);
        Ok(())
    }

    /// Release the lock.
    ///
    /// Fails with [`LatchError::NotLocked`] if the lock was never taken or has
    /// already expired; the two cases cannot be told apart.
    #[instrument(skip(self), fields(key = %self.key), level = "debug")]
    pub async fn unlock(&self) -> Result<()> {
        let key = self.codec.key(&self.key)?;

        if !self.store.release(&key).await? {
            debug!("Unlock of {} found no live lock", key);
            return Err(LatchError::NotLocked(key));
        }

        debug!("Unlocked {}", key);
        Ok(())
    }

    /// Diagnostic view of whether the lock is currently held by anyone.
    pub async fn is_locked(&self) -> bool {
        match self.codec.key(&self.key) {
            Ok(key) => self.store.exists(&key).await,
            Err(_) => false,
        }
    }
}
