use crate::error::{LatchError, Result};

/// Namespace used by [`crate::LockManager`] unless overridden.
pub const LOCK_NAMESPACE: &str = "dlm";

/// Namespace used by [`crate::IdempotencyGuard`] unless overridden.
pub const IDEMPOTENCY_NAMESPACE: &str = "idempotency";

/// Separator between namespace and raw key.
pub const KEY_SEPARATOR: char = ':';

/// Turns caller-supplied keys into namespaced backend keys.
///
/// Keys: `{prefix}:{raw}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    /// Create a codec for the given namespace prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace a raw key. Fails with [`LatchError::KeyEmpty`] on `""`.
    pub fn key(&self, raw: &str) -> Result<String> {
        if raw.is_empty() {
            return Err(LatchError::KeyEmpty);
        }
        Ok(format!("{}{}{}", self.prefix, KEY_SEPARATOR, raw))
    }
}

/// Reject empty keys at the store boundary.
pub fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LatchError::KeyEmpty);
    }
    Ok(())
}
