use thiserror::Error;

/// Errors that can occur in the coordination layer.
///
/// Logical outcomes (`AlreadyLocked`, `NotLocked`, `Conflict`) are kept
/// apart from `BackendUnavailable` so a caller never mistakes an I/O failure
/// for contention.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LatchError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Not connected")]
    NotConnected,

    #[error("Key must not be empty")]
    KeyEmpty,

    #[error("Key already locked: {0}")]
    AlreadyLocked(String),

    #[error("Key not locked: {0}")]
    NotLocked(String),

    #[error("Key already admitted: {0}")]
    Conflict(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl LatchError {
    /// Stable machine-readable code, used in logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            LatchError::ConfigInvalid(_) => "CONFIG_INVALID",
            LatchError::AlreadyConnected => "ALREADY_CONNECTED",
            LatchError::NotConnected => "NOT_CONNECTED",
            LatchError::KeyEmpty => "KEY_EMPTY",
            LatchError::AlreadyLocked(_) => "ALREADY_LOCKED",
            LatchError::NotLocked(_) => "NOT_LOCKED",
            LatchError::Conflict(_) => "CONFLICT",
            LatchError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
        }
    }

    /// Whether the error is an expected contention outcome rather than a
    /// failure of the caller or the backend.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            LatchError::AlreadyLocked(_) | LatchError::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            LatchError::ConfigInvalid("x".into()),
            LatchError::AlreadyConnected,
            LatchError::NotConnected,
            LatchError::KeyEmpty,
            LatchError::AlreadyLocked("k".into()),
            LatchError::NotLocked("k".into()),
            LatchError::Conflict("k".into()),
            LatchError::BackendUnavailable("down".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(LatchError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_backend_failure_is_not_contention() {
        assert!(LatchError::AlreadyLocked("k".into()).is_contention());
        assert!(LatchError::Conflict("k".into()).is_contention());
        assert!(!LatchError::BackendUnavailable("timeout".into()).is_contention());
        assert!(!LatchError::NotLocked("k".into()).is_contention());
    }

    #[test]
    fn test_display_carries_key() {
        let err = LatchError::AlreadyLocked("dlm:job-1".into());
        assert_eq!(err.to_string(), "Key already locked: dlm:job-1");
    }
}
