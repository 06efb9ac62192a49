//! Plugin Test Utilities
//!
//! Fixtures that seed a `MemoryServer` with a consistent detector: a camera
//! plus plugins wired into a pipeline through their port names.

use crate::core::wait::{poll_until, PollPolicy};
use crate::plugin::base::Plugin;
use crate::plugin::camera::CAMERA_CONFIG_ATTRS;
use crate::plugin::detector::AreaDetector;
use crate::plugin::settings::PluginSettings;
use crate::plugin::types::{PluginClass, TypeState};
use crate::point::api::MemoryServer;
use std::sync::Arc;
use std::time::Duration;

pub const DET_PREFIX: &str = "XF:DET:";
pub const CAM_PREFIX: &str = "XF:DET:cam1:";
pub const CAM_PORT: &str = "CAM";

/// Settings with short deadlines so failure paths finish quickly
pub fn fast_settings() -> PluginSettings {
    PluginSettings {
        discovery_secs: 0.2,
        connection_secs: 0.2,
        settle_secs: 0.2,
        poll_interval_ms: 5,
        warmup_acquire_secs: 0.0,
    }
}

/// Seed the camera's port, configuration and staging points
pub fn seed_camera(server: &MemoryServer) {
    for attr in CAMERA_CONFIG_ATTRS {
        server.seed(&format!("{CAM_PREFIX}{}", attr.suffix), 0);
    }
    server.seed(&format!("{CAM_PREFIX}PortName_RBV"), CAM_PORT);
    server.seed(&format!("{CAM_PREFIX}Manufacturer_RBV"), "Simulated");
    server.seed_with_readback(&format!("{CAM_PREFIX}ArrayCallbacks"), 0);
}

/// Seed every point a plugin of `class` reads or stages at `prefix`
pub fn seed_plugin(
    server: &MemoryServer,
    prefix: &str,
    class: &PluginClass,
    port: &str,
    source: &str,
) {
    for attr in class.configuration_attrs() {
        server.seed(&format!("{prefix}{}", attr.suffix), 0);
    }
    server.seed(&format!("{prefix}PortName_RBV"), port);
    server.seed(&format!("{prefix}NDArrayPort_RBV"), source);
    server.seed(
        &format!("{prefix}PluginType_RBV"),
        format!("{} 1.9.1", class.plugin_type.unwrap_or_default()),
    );
    server.seed_with_readback(&format!("{prefix}EnableCallbacks"), 0);
    server.seed_with_readback(&format!("{prefix}BlockingCallbacks"), "No");
}

/// Server and detector with the camera seeded and fast settings applied
pub fn detector() -> (MemoryServer, AreaDetector) {
    let server = MemoryServer::new();
    seed_camera(&server);
    let det = AreaDetector::new("det", DET_PREFIX, Arc::new(server.clone()));
    det.set_plugin_settings(fast_settings());
    (server, det)
}

/// Seed and attach a plugin in one step
pub fn attach(
    server: &MemoryServer,
    det: &AreaDetector,
    attr: &str,
    suffix: &str,
    class: &'static PluginClass,
    port: &str,
    source: &str,
) -> Arc<Plugin> {
    seed_plugin(server, &format!("{DET_PREFIX}{suffix}"), class, port, source);
    det.add_plugin(attr, suffix, class)
}

/// Wait until the plugin's type state leaves `Unknown`
pub async fn settled_type_state(plugin: &Plugin) -> Option<TypeState> {
    let policy = PollPolicy {
        deadline: Duration::from_secs(1),
        interval: Duration::from_millis(5),
    };
    poll_until("type state", policy, || async {
        let state = plugin.type_state();
        Ok::<_, ()>(state.is_terminal().then_some(state))
    })
    .await
    .ok()
    .flatten()
}
