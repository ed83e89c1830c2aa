//! Redis-compatible networked backend for latch.
//!
//! Talks plain Redis wire commands (`SET NX PX`, `DEL`, `EXISTS`, `PING`), so
//! any server speaking them (Redis, KeyDB, Valkey, Dragonfly) can back locks
//! and idempotency keys shared across processes and hosts.

mod store;

pub use store::{RedisStore, DEFAULT_POOL_SIZE};
