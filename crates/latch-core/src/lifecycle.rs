use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{LatchError, Result};

/// Default bound on a readiness/liveness round trip.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection state of a backend-backed resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Constructed, `connect` never succeeded.
    #[default]
    Uninitialized,
    Connected,
    /// Cleanly disconnected on request.
    Disconnected,
}

impl ConnectionStatus {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionStatus::Uninitialized => 0,
            ConnectionStatus::Connected => 1,
            ConnectionStatus::Disconnected => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionStatus::Connected,
            2 => ConnectionStatus::Disconnected,
            _ => ConnectionStatus::Uninitialized,
        }
    }
}

/// Lifecycle contract shared by every backend-backed component.
///
/// Construction and connection are separate steps: a resource can be built
/// (and its configuration validated) long before it opens a session.
#[async_trait]
pub trait Connectable: Send + Sync {
    /// Open the backend session.
    ///
    /// Fails with [`LatchError::AlreadyConnected`] if already connected.
    async fn connect(&self) -> Result<()>;

    /// Close the backend session and free its resources.
    ///
    /// Fails with [`LatchError::NotConnected`] if not connected.
    async fn disconnect(&self) -> Result<()>;

    /// Check whether the resource can serve requests.
    ///
    /// Succeeds after a clean disconnect so graceful shutdowns do not raise
    /// alarms; fails with [`LatchError::NotConnected`] before `connect`.
    async fn readiness(&self) -> Result<()>;

    /// Check whether the resource is still alive. Same status rules as
    /// [`Connectable::readiness`].
    async fn liveness(&self) -> Result<()>;
}

/// Status bookkeeping used by the store implementations.
///
/// Transitions run under one async mutex, so concurrent `connect` (or
/// `disconnect`) calls have exactly one winner and the losers observe
/// `AlreadyConnected` (or `NotConnected`). Each transition publishes the new
/// status to an atomic, which is what [`Lifecycle::status`] and
/// [`Lifecycle::ensure_connected`] read: per-key operations never wait on
/// the transition mutex.
#[derive(Debug, Default)]
pub struct Lifecycle {
    transition: Mutex<ConnectionStatus>,
    current: AtomicU8,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.current.load(Ordering::Acquire))
    }

    fn publish(&self, status: &mut ConnectionStatus, next: ConnectionStatus) {
        *status = next;
        self.current.store(next.as_u8(), Ordering::Release);
    }

    /// Transition to `Connected`, running `open` inside the critical section.
    ///
    /// If `open` fails the status is left untouched.
    pub async fn connect<F, Fut>(&self, open: F) -> Result<()>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        let mut status = self.transition.lock().await;
        if *status == ConnectionStatus::Connected {
            return Err(LatchError::AlreadyConnected);
        }

        open().await?;
        self.publish(&mut status, ConnectionStatus::Connected);
        debug!("Resource connected");
        Ok(())
    }

    /// Transition to `Disconnected`, running `close` inside the critical
    /// section.
    ///
    /// The status changes even if `close` fails; the close error is still
    /// returned to the caller.
    pub async fn disconnect<F, Fut>(&self, close: F) -> Result<()>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        let mut status = self.transition.lock().await;
        if *status != ConnectionStatus::Connected {
            return Err(LatchError::NotConnected);
        }

        self.publish(&mut status, ConnectionStatus::Disconnected);
        let closed = close().await;
        debug!("Resource disconnected");
        closed
    }

    /// Fail with `NotConnected` unless the resource is connected.
    pub fn ensure_connected(&self) -> Result<()> {
        match self.status() {
            ConnectionStatus::Connected => Ok(()),
            _ => Err(LatchError::NotConnected),
        }
    }

    /// Run a health check according to the status rules of
    /// [`Connectable::readiness`], bounding `ping` by `timeout`.
    pub async fn check_health<F, Fut>(&self, timeout: Duration, ping: F) -> Result<()>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        match self.status() {
            ConnectionStatus::Disconnected => return Ok(()),
            ConnectionStatus::Uninitialized => return Err(LatchError::NotConnected),
            ConnectionStatus::Connected => {}
        }

        match tokio::time::timeout(timeout, ping()).await {
            Ok(result) => result,
            Err(_) => Err(LatchError::BackendUnavailable(format!(
                "health check timed out after {:?}",
                timeout
            ))),
        }
    }
}
