use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::lifecycle::Connectable;

/// Atomic create-if-absent store with per-entry expiry.
///
/// This is the single primitive both [`crate::LockManager`] and
/// [`crate::IdempotencyGuard`] are built on. Keys reaching a store are
/// already namespaced by a [`crate::KeyCodec`].
///
/// Entries carry no holder identity: anyone who knows a key can release it.
#[async_trait]
pub trait AtomicStore: Connectable {
    /// Backend name for diagnostics (e.g. "memory", "redis").
    fn backend(&self) -> &'static str;

    /// Create `key` with expiry `now + ttl` if and only if it is absent.
    ///
    /// # Returns
    /// * `Ok(true)` - this call created the entry
    /// * `Ok(false)` - a live entry already exists (contention, not a failure)
    /// * `Err(BackendUnavailable)` - the backend could not answer
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Delete `key` if present.
    ///
    /// Returns `Ok(false)` when the entry was already absent (expired or
    /// never acquired).
    async fn release(&self, key: &str) -> Result<bool>;

    /// Best-effort existence check. Backend errors read as `false`.
    ///
    /// The answer can change before the caller acts on it, so it is only
    /// suitable for diagnostics.
    async fn exists(&self, key: &str) -> bool;
}
