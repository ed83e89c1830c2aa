//! In-process memory backend for latch.
//!
//! Suitable for single-process deployments and tests. Locks and idempotency
//! keys live only as long as the process.

mod store;
mod sweep;

pub use store::MemoryStore;
