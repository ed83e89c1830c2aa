use std::sync::Arc;

use latch_core::{AtomicStore, BackendKind, Config, Result};
use latch_memory::MemoryStore;
use latch_redis::RedisStore;

/// Build the store selected by the URI scheme. The store is not connected.
///
/// `pool_size` only applies to Redis.
pub fn open_store(config: &Config, pool_size: usize) -> Result<Arc<dyn AtomicStore>> {
    let store: Arc<dyn AtomicStore> = match config.backend_kind()? {
        BackendKind::Memory => Arc::new(MemoryStore::from_config(config)?),
        BackendKind::Redis => Arc::new(RedisStore::new(config)?.with_pool_size(pool_size)),
    };
    Ok(store)
}
