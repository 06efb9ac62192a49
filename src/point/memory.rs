//! In-memory control-system server
//!
//! Behaves like a live server from the point of view of a client: points
//! come and go, connection callbacks fire on state changes, setpoints are
//! mirrored onto their `_RBV` readbacks, and every accepted write lands in
//! an ordered journal. Individual points can be frozen, made to reject
//! writes, disconnected or destroyed to drive failure paths.

// Simulation controls recover from poisoning; only client-facing calls
// report it as an error.
use crate::core::sync::{handle_mutex_poison, recover_lock as recover};
use crate::point::error::{PointError, PointResult};
use crate::point::traits::{
    ConnectionCallback, ConnectionSubscription, PointProvider, RemotePoint,
};
use crate::point::value::PointValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;

const READBACK_SUFFIX: &str = "_RBV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Disconnected,
    Connected,
    Destroyed,
}

#[derive(Debug, Default)]
struct PointState {
    value: Option<PointValue>,
    frozen: bool,
    rejection: Option<String>,
}

#[derive(Debug, Default)]
struct ServerInner {
    points: Mutex<HashMap<String, Arc<MemoryPoint>>>,
    journal: Mutex<Vec<(String, PointValue)>>,
}

/// Simulated control-system server
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    inner: Arc<ServerInner>,
}

/// One point hosted by a `MemoryServer`
pub struct MemoryPoint {
    name: String,
    server: Weak<ServerInner>,
    state: Mutex<PointState>,
    link: watch::Sender<Link>,
    callbacks: Arc<Mutex<Vec<(u64, ConnectionCallback)>>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for MemoryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPoint")
            .field("name", &self.name)
            .field("link", &*self.link.borrow())
            .finish()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Arc<MemoryPoint> {
        let mut points = recover(self.inner.points.lock());
        points
            .entry(name.to_string())
            .or_insert_with(|| {
                let (link, _) = watch::channel(Link::Disconnected);
                Arc::new(MemoryPoint {
                    name: name.to_string(),
                    server: Arc::downgrade(&self.inner),
                    state: Mutex::new(PointState::default()),
                    link,
                    callbacks: Arc::new(Mutex::new(Vec::new())),
                    next_subscription: AtomicU64::new(0),
                })
            })
            .clone()
    }

    fn existing(&self, name: &str) -> Option<Arc<MemoryPoint>> {
        recover(self.inner.points.lock()).get(name).cloned()
    }

    /// Set a point's value and bring it online
    pub fn seed(&self, name: &str, value: impl Into<PointValue>) {
        let point = self.entry(name);
        recover(point.state.lock()).value = Some(value.into());
        point.set_link(Link::Connected);
    }

    /// Set a point's value without connecting it
    pub fn seed_offline(&self, name: &str, value: impl Into<PointValue>) {
        let point = self.entry(name);
        recover(point.state.lock()).value = Some(value.into());
    }

    /// Seed a setpoint and its `_RBV` readback with the same value
    pub fn seed_with_readback(&self, name: &str, value: impl Into<PointValue>) {
        let value = value.into();
        self.seed(name, value.clone());
        self.seed(&format!("{name}{READBACK_SUFFIX}"), value);
    }

    pub fn connect(&self, name: &str) {
        let point = self.entry(name);
        {
            let mut state = recover(point.state.lock());
            if state.value.is_none() {
                state.value = Some(PointValue::Int(0));
            }
        }
        point.set_link(Link::Connected);
    }

    pub fn disconnect(&self, name: &str) {
        if let Some(point) = self.existing(name) {
            point.set_link(Link::Disconnected);
        }
    }

    /// Tear a point down; any later access fails with `Destroyed`
    pub fn destroy(&self, name: &str) {
        self.entry(name).set_link(Link::Destroyed);
    }

    /// Stop mirrored setpoint writes from updating this readback
    pub fn freeze(&self, name: &str) {
        recover(self.entry(name).state.lock()).frozen = true;
    }

    /// Make every write to this point fail with `Rejected`
    pub fn reject_writes(&self, name: &str, reason: &str) {
        recover(self.entry(name).state.lock()).rejection = Some(reason.to_string());
    }

    /// Current value, bypassing connection state
    pub fn value(&self, name: &str) -> Option<PointValue> {
        self.existing(name)
            .and_then(|point| recover(point.state.lock()).value.clone())
    }

    /// Every accepted client write, in order
    pub fn journal(&self) -> Vec<(String, PointValue)> {
        recover(self.inner.journal.lock()).clone()
    }

    /// Names written, in order, restricted to one prefix
    pub fn writes_under(&self, prefix: &str) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name)
            .collect()
    }

    pub fn clear_journal(&self) {
        recover(self.inner.journal.lock()).clear();
    }

    /// Number of live connection subscriptions on a point
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.existing(name)
            .map_or(0, |point| recover(point.callbacks.lock()).len())
    }

    /// Names of every point known to the server, sorted
    pub fn point_names(&self) -> Vec<String> {
        let mut names: Vec<String> = recover(self.inner.points.lock()).keys().cloned().collect();
        names.sort();
        names
    }
}

impl PointProvider for MemoryServer {
    fn point(&self, name: &str) -> Arc<dyn RemotePoint> {
        self.entry(name)
    }
}

impl MemoryPoint {
    fn set_link(&self, next: Link) {
        // destroyed points stay destroyed
        let changed = self.link.send_if_modified(|link| {
            if *link == Link::Destroyed || *link == next {
                return false;
            }
            *link = next;
            true
        });
        if !changed {
            return;
        }

        let callbacks: Vec<ConnectionCallback> = recover(self.callbacks.lock())
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        let connected = next == Link::Connected;
        for callback in callbacks {
            callback(connected);
        }
    }

    fn current_link(&self) -> Link {
        *self.link.borrow()
    }

    fn check_link(&self) -> PointResult<()> {
        match self.current_link() {
            Link::Connected => Ok(()),
            Link::Destroyed => Err(PointError::Destroyed {
                name: self.name.clone(),
            }),
            Link::Disconnected => Err(PointError::Disconnected {
                name: self.name.clone(),
                reason: "channel not connected".to_string(),
            }),
        }
    }

    fn poisoned(&self) -> impl FnOnce(String) -> PointError + '_ {
        move |reason| PointError::Disconnected {
            name: self.name.clone(),
            reason,
        }
    }

    fn mirror_to_readback(&self, value: &PointValue) {
        if self.name.ends_with(READBACK_SUFFIX) {
            return;
        }
        let Some(server) = self.server.upgrade() else {
            return;
        };
        let readback_name = format!("{}{}", self.name, READBACK_SUFFIX);
        let readback = recover(server.points.lock()).get(&readback_name).cloned();
        if let Some(readback) = readback {
            let mut state = recover(readback.state.lock());
            if !state.frozen && readback.current_link() == Link::Connected {
                state.value = Some(value.clone());
            }
        }
    }
}

#[async_trait::async_trait]
impl RemotePoint for MemoryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.current_link() == Link::Connected
    }

    async fn get(&self) -> PointResult<PointValue> {
        self.check_link()?;
        let state = handle_mutex_poison(self.state.lock(), self.poisoned())?;
        state.value.clone().ok_or_else(|| PointError::Disconnected {
            name: self.name.clone(),
            reason: "no value received".to_string(),
        })
    }

    async fn put(&self, value: PointValue, _wait: bool) -> PointResult<()> {
        self.check_link()?;
        {
            let mut state = handle_mutex_poison(self.state.lock(), self.poisoned())?;
            if let Some(reason) = &state.rejection {
                return Err(PointError::Rejected {
                    name: self.name.clone(),
                    reason: reason.clone(),
                });
            }
            state.value = Some(value.clone());
        }

        if let Some(server) = self.server.upgrade() {
            recover(server.journal.lock()).push((self.name.clone(), value.clone()));
        }
        self.mirror_to_readback(&value);
        Ok(())
    }

    fn subscribe_connection(&self, callback: ConnectionCallback) -> ConnectionSubscription {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        recover(self.callbacks.lock()).push((id, Arc::clone(&callback)));
        if self.is_connected() {
            callback(true);
        }

        let callbacks = Arc::downgrade(&self.callbacks);
        ConnectionSubscription::new(move || {
            if let Some(callbacks) = callbacks.upgrade() {
                recover(callbacks.lock()).retain(|(existing, _)| *existing != id);
            }
        })
    }

    async fn wait_for_connection(&self, timeout: Duration) -> PointResult<()> {
        let mut rx = self.link.subscribe();
        let outcome = tokio::time::timeout(timeout, async move {
            rx.wait_for(|link| *link != Link::Disconnected)
                .await
                .map(|link| *link)
        })
        .await;

        match outcome {
            Ok(Ok(Link::Connected)) => Ok(()),
            Ok(Ok(_)) | Ok(Err(_)) => Err(PointError::Destroyed {
                name: self.name.clone(),
            }),
            Err(_) => Err(PointError::Timeout {
                name: self.name.clone(),
                operation: "connection".to_string(),
                timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_after_seed() {
        let server = MemoryServer::new();
        server.seed("DET:cam1:PortName_RBV", "CAM");

        let point = server.point("DET:cam1:PortName_RBV");
        assert!(point.is_connected());
        assert_eq!(point.get().await.unwrap(), PointValue::from("CAM"));
    }

    #[tokio::test]
    async fn test_unknown_point_is_disconnected() {
        let server = MemoryServer::new();
        let point = server.point("DET:nothing");

        assert!(!point.is_connected());
        assert!(matches!(
            point.get().await,
            Err(PointError::Disconnected { .. })
        ));
    }

    #[tokio::test]
    async fn test_destroyed_is_distinct_from_disconnected() {
        let server = MemoryServer::new();
        server.seed("DET:Stats1:PluginType_RBV", "NDPluginStats");
        server.destroy("DET:Stats1:PluginType_RBV");

        let point = server.point("DET:Stats1:PluginType_RBV");
        assert_eq!(
            point.get().await,
            Err(PointError::Destroyed {
                name: "DET:Stats1:PluginType_RBV".to_string()
            })
        );

        // Reconnecting a destroyed point does not bring it back
        server.connect("DET:Stats1:PluginType_RBV");
        assert!(!point.is_connected());
    }

    #[tokio::test]
    async fn test_put_mirrors_readback_and_journals() {
        let server = MemoryServer::new();
        server.seed_with_readback("DET:ROI1:MinX", 0);

        server
            .point("DET:ROI1:MinX")
            .put(PointValue::Int(10), true)
            .await
            .unwrap();

        assert_eq!(server.value("DET:ROI1:MinX_RBV"), Some(PointValue::Int(10)));
        assert_eq!(
            server.journal(),
            vec![("DET:ROI1:MinX".to_string(), PointValue::Int(10))]
        );
    }

    #[tokio::test]
    async fn test_frozen_readback_keeps_old_value() {
        let server = MemoryServer::new();
        server.seed_with_readback("DET:ROI1:EnableCallbacks", 0);
        server.freeze("DET:ROI1:EnableCallbacks_RBV");

        server
            .point("DET:ROI1:EnableCallbacks")
            .put(PointValue::Int(1), true)
            .await
            .unwrap();

        assert_eq!(
            server.value("DET:ROI1:EnableCallbacks_RBV"),
            Some(PointValue::Int(0))
        );
    }

    #[tokio::test]
    async fn test_rejected_write_leaves_value() {
        let server = MemoryServer::new();
        server.seed("DET:ROI1:SizeX", 50);
        server.reject_writes("DET:ROI1:SizeX", "out of range");

        let result = server
            .point("DET:ROI1:SizeX")
            .put(PointValue::Int(5000), true)
            .await;

        assert!(matches!(result, Err(PointError::Rejected { .. })));
        assert_eq!(server.value("DET:ROI1:SizeX"), Some(PointValue::Int(50)));
        assert!(server.journal().is_empty());
    }

    #[tokio::test]
    async fn test_connection_callbacks() {
        let server = MemoryServer::new();
        let point = server.point("DET:Stats1:PluginType_RBV");
        let connects = Arc::new(AtomicUsize::new(0));
        let disconnects = Arc::new(AtomicUsize::new(0));

        let (c, d) = (connects.clone(), disconnects.clone());
        let _first = point.subscribe_connection(Arc::new(move |connected| {
            if connected {
                c.fetch_add(1, Ordering::SeqCst);
            } else {
                d.fetch_add(1, Ordering::SeqCst);
            }
        }));
        assert_eq!(connects.load(Ordering::SeqCst), 0);

        server.seed("DET:Stats1:PluginType_RBV", "NDPluginStats");
        server.seed("DET:Stats1:PluginType_RBV", "NDPluginStats");
        assert_eq!(connects.load(Ordering::SeqCst), 1);

        server.disconnect("DET:Stats1:PluginType_RBV");
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);

        // Subscribing to a connected point fires immediately
        server.connect("DET:Stats1:PluginType_RBV");
        let late = Arc::new(AtomicUsize::new(0));
        let l = late.clone();
        let second = point.subscribe_connection(Arc::new(move |connected| {
            if connected {
                l.fetch_add(1, Ordering::SeqCst);
            }
        }));
        assert_eq!(late.load(Ordering::SeqCst), 1);
        assert_eq!(server.subscriber_count("DET:Stats1:PluginType_RBV"), 2);

        // A dropped subscription no longer fires
        drop(second);
        assert_eq!(server.subscriber_count("DET:Stats1:PluginType_RBV"), 1);
        server.disconnect("DET:Stats1:PluginType_RBV");
        server.connect("DET:Stats1:PluginType_RBV");
        assert_eq!(late.load(Ordering::SeqCst), 1);
        assert_eq!(connects.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_connection() {
        let server = MemoryServer::new();
        let point = server.point("DET:HDF1:PluginType_RBV");

        let result = point.wait_for_connection(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(PointError::Timeout { .. })));

        let delayed = server.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            delayed.seed("DET:HDF1:PluginType_RBV", "NDFileHDF5");
        });
        point
            .wait_for_connection(Duration::from_secs(1))
            .await
            .unwrap();
    }
}
