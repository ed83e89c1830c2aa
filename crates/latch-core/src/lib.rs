//! Core traits and types for latch coordination backends.
//!
//! This crate defines the abstractions shared by the memory and Redis backends:
//! - `Connectable`: connect / disconnect / readiness / liveness lifecycle
//! - `AtomicStore`: TTL-bearing atomic create-if-absent primitive
//! - `LockManager` / `Locker`: TTL-bound mutual exclusion over a named key
//! - `IdempotencyGuard`: exactly-once admission of a key within a TTL window

mod config;
mod error;
mod idempotency;
mod key;
mod lifecycle;
mod lock;
mod store;

#[cfg(test)]
mod testing;

pub use config::{ensure_ttl, BackendKind, Config, MAX_TTL, SUPPORTED_SCHEMES};
pub use error::{LatchError, Result};
pub use idempotency::IdempotencyGuard;
pub use key::{ensure_key, KeyCodec, IDEMPOTENCY_NAMESPACE, KEY_SEPARATOR, LOCK_NAMESPACE};
pub use lifecycle::{Connectable, ConnectionStatus, Lifecycle, DEFAULT_HEALTH_TIMEOUT};
pub use lock::{LockManager, Locker};
pub use store::AtomicStore;
