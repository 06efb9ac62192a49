//! Remote Point Trait System
//!
//! Everything above this layer talks to the control-system server through
//! these two traits, so the object model can run against a live server or
//! against the in-memory simulator without change.

use crate::point::error::PointResult;
use crate::point::value::PointValue;
use std::sync::Arc;
use std::time::Duration;

/// Connection-state callback, invoked with `true` on connect and `false` on
/// disconnect or destruction.
///
/// Callbacks run on the point layer's own context, asynchronously with
/// respect to whoever is using the point.
pub type ConnectionCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Keeps a connection callback registered; dropping it unsubscribes
#[must_use = "dropping the subscription unregisters the callback"]
pub struct ConnectionSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ConnectionSubscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl std::fmt::Debug for ConnectionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for ConnectionSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Handle to one named remote control value
#[async_trait::async_trait]
pub trait RemotePoint: Send + Sync + std::fmt::Debug {
    /// Full point name (prefix + suffix)
    fn name(&self) -> &str;

    /// Whether the point is currently connected
    fn is_connected(&self) -> bool;

    /// Read the current value
    async fn get(&self) -> PointResult<PointValue>;

    /// Write a value; with `wait` the call returns once the server has
    /// processed the write
    async fn put(&self, value: PointValue, wait: bool) -> PointResult<()>;

    /// Register a connection callback until the returned subscription is
    /// dropped.
    ///
    /// The callback fires at least once after the initial connection; if the
    /// point is already connected it fires immediately.
    fn subscribe_connection(&self, callback: ConnectionCallback) -> ConnectionSubscription;

    /// Block until the point connects or `timeout` elapses
    async fn wait_for_connection(&self, timeout: Duration) -> PointResult<()>;
}

/// Source of remote point handles
pub trait PointProvider: Send + Sync + std::fmt::Debug {
    /// Handle for the named point. Creating a handle never blocks; the
    /// point may still be disconnected.
    fn point(&self, name: &str) -> Arc<dyn RemotePoint>;
}
