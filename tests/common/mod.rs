//! Common test fixtures
//!
//! A camera plus plugins seeded on an in-memory server, wired together
//! through their port names.

#![allow(dead_code)]

use adpipeline::plugin::api::{AreaDetector, Plugin, PluginClass, PluginSettings};
use adpipeline::point::api::MemoryServer;
use std::sync::Arc;

pub const DET_PREFIX: &str = "XF:DET:";
pub const CAM_PREFIX: &str = "XF:DET:cam1:";
pub const CAM_PORT: &str = "CAM";

pub fn fast_settings() -> PluginSettings {
    PluginSettings {
        discovery_secs: 0.2,
        connection_secs: 0.2,
        settle_secs: 0.2,
        poll_interval_ms: 5,
        warmup_acquire_secs: 0.0,
    }
}

pub fn seed_plugin(server: &MemoryServer, prefix: &str, class: &PluginClass, port: &str, source: &str) {
    for attr in class.configuration_attrs() {
        server.seed(&format!("{prefix}{}", attr.suffix), 0);
    }
    server.seed(&format!("{prefix}PortName_RBV"), port);
    server.seed(&format!("{prefix}NDArrayPort_RBV"), source);
    if let Some(plugin_type) = class.plugin_type {
        server.seed(&format!("{prefix}PluginType_RBV"), format!("{plugin_type} 1.9.1"));
    }
    server.seed_with_readback(&format!("{prefix}EnableCallbacks"), 0);
    server.seed_with_readback(&format!("{prefix}BlockingCallbacks"), "No");
}

pub struct Fixture {
    pub server: MemoryServer,
    pub detector: AreaDetector,
}

impl Fixture {
    pub fn new() -> Self {
        let server = MemoryServer::new();
        for suffix in [
            "Manufacturer_RBV",
            "Model_RBV",
            "AcquireTime_RBV",
            "AcquirePeriod_RBV",
            "ImageMode_RBV",
            "TriggerMode_RBV",
        ] {
            server.seed(&format!("{CAM_PREFIX}{suffix}"), 0);
        }
        server.seed(&format!("{CAM_PREFIX}PortName_RBV"), CAM_PORT);
        server.seed_with_readback(&format!("{CAM_PREFIX}ArrayCallbacks"), 0);

        let detector = AreaDetector::new("det", DET_PREFIX, Arc::new(server.clone()));
        detector.set_plugin_settings(fast_settings());
        Self { server, detector }
    }

    pub fn attach(
        &self,
        attr: &str,
        suffix: &str,
        class: &'static PluginClass,
        port: &str,
        source: &str,
    ) -> Arc<Plugin> {
        seed_plugin(&self.server, &format!("{DET_PREFIX}{suffix}"), class, port, source);
        self.detector.add_plugin(attr, suffix, class)
    }
}
