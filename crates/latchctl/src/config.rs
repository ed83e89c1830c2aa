use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use latch_core::Config;

/// Command-line configuration for latchctl.
#[derive(Parser, Debug, Clone)]
#[command(name = "latchctl")]
#[command(about = "Distributed lock and idempotency key client")]
pub struct Cli {
    /// Backend URI: memory:// or redis://host:port/db
    #[arg(long, default_value = "memory://", env = "LATCH_URI")]
    pub uri: String,

    /// TTL applied when a command does not pass --ttl-ms
    #[arg(long, default_value = "30000", env = "LATCH_DEFAULT_TTL_MS")]
    pub default_ttl_ms: u64,

    /// Bound on each backend command and health check
    #[arg(long, default_value = "3000", env = "LATCH_OP_TIMEOUT_MS")]
    pub op_timeout_ms: u64,

    /// Pooled connections per Redis store
    #[arg(long, default_value_t = latch_redis::DEFAULT_POOL_SIZE, env = "LATCH_POOL_SIZE")]
    pub pool_size: usize,

    /// JSON config file; replaces --uri, --default-ttl-ms and --op-timeout-ms
    #[arg(long, env = "LATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Acquire a lock
    Lock {
        key: String,
        /// Lock TTL (defaults to the configured TTL)
        #[arg(long)]
        ttl_ms: Option<u64>,
        /// Hold the lock this long (or until Ctrl+C), then release it
        #[arg(long)]
        hold_ms: Option<u64>,
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Release a lock
    Unlock {
        key: String,
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Admit an idempotency key once per TTL window
    Validate {
        key: String,
        /// Admission window (defaults to the configured TTL)
        #[arg(long)]
        ttl_ms: Option<u64>,
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Check whether a namespaced key is currently held
    Exists {
        key: String,
        /// Namespace prefix, e.g. dlm or idempotency
        #[arg(long, default_value = latch_core::LOCK_NAMESPACE)]
        namespace: String,
    },
    /// Connect and run readiness and liveness checks
    Health,
}

impl Command {
    /// Whether the command listens for Ctrl+C itself. `lock --hold-ms`
    /// releases its lock on the signal, so nothing else may cancel it.
    pub fn handles_interrupt(&self) -> bool {
        matches!(self, Command::Lock { hold_ms: Some(_), .. })
    }
}

impl Cli {
    /// Resolve and validate the store configuration.
    pub fn store_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str::<Config>(&content)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => Config::new(self.uri.as_str(), Duration::from_millis(self.default_ttl_ms))
                .with_op_timeout(Duration::from_millis(self.op_timeout_ms)),
        };

        config.validate()?;
        Ok(config)
    }
}
