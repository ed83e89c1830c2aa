use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{LatchError, Result};
use crate::key::{KeyCodec, IDEMPOTENCY_NAMESPACE};
use crate::lifecycle::Connectable;
use crate::store::AtomicStore;

/// Exactly-once admission of operation identifiers within a TTL window.
///
/// The first `validate` of a key admits it; every further `validate` before
/// the TTL elapses is a [`LatchError::Conflict`]. Keys are never released
/// explicitly: expiry is the only way a key becomes admissible again, which
/// bounds deduplication to the retry window instead of forever.
#[derive(Clone)]
pub struct IdempotencyGuard {
    store: Arc<dyn AtomicStore>,
    codec: KeyCodec,
    ttl: Duration,
}

impl IdempotencyGuard {
    /// Create a guard in the default `idempotency` namespace.
    pub fn new(store: Arc<dyn AtomicStore>, ttl: Duration) -> Self {
        Self::with_namespace(store, IDEMPOTENCY_NAMESPACE, ttl)
    }

    pub fn with_namespace(
        store: Arc<dyn AtomicStore>,
        namespace: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            codec: KeyCodec::new(namespace),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Admit `key` once per TTL window.
    #[instrument(skip(self), level = "debug")]
    pub async fn validate(&self, key: &str) -> Result<()> {
        let key = self.codec.key(key)?;

        if !self.store.try_acquire(&key, self.ttl).await? {
            debug!("Duplicate admission of {}", key);
            return Err(LatchError::Conflict(key));
        }

        debug!("Admitted {} for {:?}", key, self.ttl);
        Ok(())
    }

    /// Diagnostic view of whether `key` is inside its admission window.
    pub async fn is_admitted(&self, key: &str) -> bool {
        match self.codec.key(key) {
            Ok(key) => self.store.exists(&key).await,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl Connectable for IdempotencyGuard {
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
