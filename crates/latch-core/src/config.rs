use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LatchError, Result};
use crate::lifecycle::DEFAULT_HEALTH_TIMEOUT;

/// URI schemes a store can be built from.
pub const SUPPORTED_SCHEMES: &[&str] = &["memory", "redis", "rediss"];

/// Longest TTL a store accepts (365 days).
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Backend family selected by the URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Redis,
}

/// Configuration shared by every store, lock manager and idempotency guard.
///
/// Durations are (de)serialized as integer milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend URI, e.g. `memory://` or `redis://localhost:6379/0`
    pub uri: String,

    /// TTL applied when a caller does not supply one
    #[serde(rename = "default_ttl_ms", with = "millis")]
    pub default_ttl: Duration,

    /// Bound on a single backend command or health check
    #[serde(
        rename = "op_timeout_ms",
        with = "millis",
        default = "default_op_timeout"
    )]
    pub op_timeout: Duration,

    /// Interval of the memory backend's expiry sweep; unset disables it
    #[serde(
        rename = "sweep_interval_ms",
        with = "opt_millis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sweep_interval: Option<Duration>,
}

fn default_op_timeout() -> Duration {
    DEFAULT_HEALTH_TIMEOUT
}

impl Config {
    /// Create a config with the default operation timeout and no sweep.
    pub fn new(uri: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            uri: uri.into(),
            default_ttl,
            op_timeout: default_op_timeout(),
            sweep_interval: None,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Validate the configuration before any resource is constructed.
    pub fn validate(&self) -> Result<()> {
        self.backend_kind()?;

        if self.default_ttl.is_zero() || self.default_ttl > MAX_TTL {
            return Err(LatchError::ConfigInvalid(format!(
                "default_ttl must be positive and at most {:?}, got {:?}",
                MAX_TTL, self.default_ttl
            )));
        }
        if self.op_timeout.is_zero() {
            return Err(LatchError::ConfigInvalid(
                "op_timeout must be positive".to_string(),
            ));
        }
        if self.sweep_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(LatchError::ConfigInvalid(
                "sweep_interval must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Scheme part of the URI, e.g. `redis`.
    pub fn scheme(&self) -> Result<&str> {
        if self.uri.trim().is_empty() {
            return Err(LatchError::ConfigInvalid("uri must not be empty".to_string()));
        }
        match self.uri.split_once("://") {
            Some((scheme, _)) if !scheme.is_empty() => Ok(scheme),
            _ => Err(LatchError::ConfigInvalid(format!(
                "uri has no scheme: {}",
                self.uri
            ))),
        }
    }

    /// Backend family for the configured URI.
    pub fn backend_kind(&self) -> Result<BackendKind> {
        match self.scheme()? {
            "memory" => Ok(BackendKind::Memory),
            "redis" | "rediss" => Ok(BackendKind::Redis),
            other => Err(LatchError::ConfigInvalid(format!(
                "unsupported uri scheme '{}' (expected one of {:?})",
                other, SUPPORTED_SCHEMES
            ))),
        }
    }
}

/// Reject zero TTLs and TTLs above [`MAX_TTL`] at the point of use.
pub fn ensure_ttl(ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(LatchError::ConfigInvalid("ttl must be positive".to_string()));
    }
    if ttl > MAX_TTL {
        return Err(LatchError::ConfigInvalid(format!(
            "ttl {:?} exceeds the maximum of {:?}",
            ttl, MAX_TTL
        )));
    }
    Ok(())
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
