//! Integration tests against a live Redis-compatible server.
//!
//! Ignored by default. Run them with `--ignored` against the server named by
//! `REDIS_URI` (default `redis://localhost:6379/0`).

use std::sync::Arc;
use std::time::Duration;

use latch_core::{AtomicStore, Config, Connectable, IdempotencyGuard, LatchError, LockManager};
use latch_redis::RedisStore;

const DEFAULT_REDIS_URI: &str = "redis://localhost:6379/0";

fn redis_uri() -> String {
    std::env::var("REDIS_URI")
        .ok()
        .filter(|uri| !uri.is_empty())
        .unwrap_or_else(|| DEFAULT_REDIS_URI.to_string())
}

async fn connected(uri: &str) -> Arc<RedisStore> {
    let store = Arc::new(RedisStore::new(&Config::new(uri, Duration::from_secs(30))).unwrap());
    store.connect().await.unwrap();
    store
}

fn unique_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URI (default redis://localhost:6379/0)"]
async fn test_lifecycle() {
    let uri = redis_uri();
    let store = RedisStore::new(&Config::new(uri.as_str(), Duration::from_secs(30))).unwrap();

    assert_eq!(store.readiness().await, Err(LatchError::NotConnected));
    assert_eq!(store.liveness().await, Err(LatchError::NotConnected));

    store.connect().await.unwrap();
    assert_eq!(store.connect().await, Err(LatchError::AlreadyConnected));
    store.readiness().await.unwrap();
    store.liveness().await.unwrap();

    store.disconnect().await.unwrap();
    store.readiness().await.unwrap();
    store.liveness().await.unwrap();
    assert_eq!(store.disconnect().await, Err(LatchError::NotConnected));

    // A fresh session can be opened after a clean disconnect
    store.connect().await.unwrap();
    store.readiness().await.unwrap();
    store.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URI (default redis://localhost:6379/0)"]
async fn test_set_nx_semantics() {
    let uri = redis_uri();
    let store = connected(&uri).await;
    let key = format!("test:{}", unique_key());

    assert!(store.try_acquire(&key, Duration::from_secs(30)).await.unwrap());
    assert!(!store.try_acquire(&key, Duration::from_secs(30)).await.unwrap());
    assert!(store.exists(&key).await);
    assert!(store.release(&key).await.unwrap());
    assert!(!store.release(&key).await.unwrap());
    assert!(!store.exists(&key).await);

    store.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URI (default redis://localhost:6379/0)"]
async fn test_lock_scenario() {
    let uri = redis_uri();
    let store = connected(&uri).await;
    let locks = LockManager::new(store.clone(), Duration::from_millis(50));
    let locker = locks.locker(unique_key());

    locker.lock().await.unwrap();
    assert!(matches!(locker.lock().await, Err(LatchError::AlreadyLocked(_))));

    tokio::time::sleep(Duration::from_millis(100)).await;
    locker.lock().await.unwrap();

    locker.unlock().await.unwrap();
    assert!(matches!(locker.unlock().await, Err(LatchError::NotLocked(_))));

    store.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URI (default redis://localhost:6379/0)"]
async fn test_idempotency_scenario() {
    let uri = redis_uri();
    let store = connected(&uri).await;
    let guard = IdempotencyGuard::new(store.clone(), Duration::from_millis(50));
    let key = unique_key();

    guard.validate(&key).await.unwrap();
    assert!(matches!(guard.validate(&key).await, Err(LatchError::Conflict(_))));

    tokio::time::sleep(Duration::from_millis(100)).await;
    guard.validate(&key).await.unwrap();

    store.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URI (default redis://localhost:6379/0)"]
async fn test_two_stores_share_one_lock() {
    let uri = redis_uri();
    let first = connected(&uri).await;
    let second = connected(&uri).await;
    let key = unique_key();

    let a = LockManager::new(first.clone(), Duration::from_secs(30)).locker(key.clone());
    let b = LockManager::new(second.clone(), Duration::from_secs(30)).locker(key);

    a.lock().await.unwrap();
    assert!(matches!(b.lock().await, Err(LatchError::AlreadyLocked(_))));
    b.unlock().await.unwrap();
    a.lock().await.unwrap();
    a.unlock().await.unwrap();

    first.disconnect().await.unwrap();
    second.disconnect().await.unwrap();
}
