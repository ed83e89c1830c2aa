use std::sync::Arc;
use std::time::Duration;

use latch_core::{
    AtomicStore, Config, IdempotencyGuard, KeyCodec, LockManager, Result, IDEMPOTENCY_NAMESPACE,
    LOCK_NAMESPACE,
};
use tracing::info;

use crate::config::Command;

/// Run one command against a connected store and describe the outcome.
pub async fn run(command: &Command, store: Arc<dyn AtomicStore>, config: &Config) -> Result<String> {
    match command {
        Command::Lock {
            key,
            ttl_ms,
            hold_ms,
            namespace,
        } => {
            let namespace = namespace.as_deref().unwrap_or(LOCK_NAMESPACE);
            let locks = LockManager::with_namespace(store, namespace, config.default_ttl);
            let mut locker = locks.locker(key.as_str());
            if let Some(ms) = ttl_ms {
                locker = locker.with_ttl(Duration::from_millis(*ms));
            }

            locker.lock().await?;
            let Some(hold_ms) = hold_ms else {
                return Ok(format!("locked {} for {:?}", key, locker.ttl()));
            };

            info!("Holding lock {} for {} ms", key, hold_ms);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(*hold_ms)) => {},
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, releasing lock"),
            }
            locker.unlock().await?;
            Ok(format!("locked and released {}", key))
        }
        Command::Unlock { key, namespace } => {
            let namespace = namespace.as_deref().unwrap_or(LOCK_NAMESPACE);
            let locks = LockManager::with_namespace(store, namespace, config.default_ttl);
            locks.locker(key.as_str()).unlock().await?;
            Ok(format!("unlocked {}", key))
        }
        Command::Validate {
            key,
            ttl_ms,
            namespace,
        } => {
            let namespace = namespace.as_deref().unwrap_or(IDEMPOTENCY_NAMESPACE);
            let ttl = (*ttl_ms).map_or(config.default_ttl, Duration::from_millis);
            let guard = IdempotencyGuard::with_namespace(store, namespace, ttl);
            guard.validate(key).await?;
            Ok(format!("admitted {} for {:?}", key, guard.ttl()))
        }
        Command::Exists { key, namespace } => {
            let key = KeyCodec::new(namespace.as_str()).key(key)?;
            let held = store.exists(&key).await;
            Ok(format!("{} {}", key, if held { "exists" } else { "absent" }))
        }
        Command::Health => {
            store.readiness().await?;
            store.liveness().await?;
            Ok(format!("{} backend healthy", store.backend()))
        }
    }
}

#[cfg(test)]
mod tests {
    use latch_core::LatchError;
    use latch_memory::MemoryStore;

    use super::*;

    async fn setup() -> (Arc<dyn AtomicStore>, Config) {
        let store: Arc<dyn AtomicStore> = Arc::new(MemoryStore::new());
        store.connect().await.unwrap();
        (store, Config::new("memory://", Duration::from_secs(30)))
    }

    fn lock(key: &str) -> Command {
        Command::Lock {
            key: key.to_string(),
            ttl_ms: None,
            hold_ms: None,
            namespace: None,
        }
    }

    #[tokio::test]
    async fn test_lock_unlock_exists() {
        let (store, config) = setup().await;

        run(&lock("job-1"), store.clone(), &config).await.unwrap();
        assert_eq!(
            run(&lock("job-1"), store.clone(), &config).await,
            Err(LatchError::AlreadyLocked("dlm:job-1".to_string()))
        );

        let exists = Command::Exists {
            key: "job-1".to_string(),
            namespace: "dlm".to_string(),
        };
        assert_eq!(
            run(&exists, store.clone(), &config).await.unwrap(),
            "dlm:job-1 exists"
        );

        let unlock = Command::Unlock {
            key: "job-1".to_string(),
            namespace: None,
        };
        run(&unlock, store.clone(), &config).await.unwrap();
        assert_eq!(
            run(&exists, store.clone(), &config).await.unwrap(),
            "dlm:job-1 absent"
        );
    }

    #[tokio::test]
    async fn test_hold_releases_lock() {
        let (store, config) = setup().await;
        let hold = Command::Lock {
            key: "job-2".to_string(),
            ttl_ms: Some(10_000),
            hold_ms: Some(10),
            namespace: None,
        };

        run(&hold, store.clone(), &config).await.unwrap();
        run(&lock("job-2"), store.clone(), &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_conflict() {
        let (store, config) = setup().await;
        let validate = Command::Validate {
            key: "req-42".to_string(),
            ttl_ms: Some(60_000),
            namespace: None,
        };

        assert_eq!(
            run(&validate, store.clone(), &config).await.unwrap(),
            "admitted req-42 for 60s"
        );
        assert_eq!(
            run(&validate, store.clone(), &config).await,
            Err(LatchError::Conflict("idempotency:req-42".to_string()))
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (store, config) = setup().await;
        assert_eq!(
            run(&Command::Health, store.clone(), &config).await.unwrap(),
            "memory backend healthy"
        );
    }
}
