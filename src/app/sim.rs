//! Simulated Detector
//!
//! Builds an `AreaDetector` over an in-memory point server from a TOML
//! description, so pipelines can be inspected and staged without a live
//! control system.
//!
//! ```toml
//! [detector]
//! name = "det"
//! prefix = "XF:DET:"
//!
//! [[plugins]]
//! attr = "stats1"
//! suffix = "Stats1:"
//! source = "PROC1"
//!
//! [points]
//! "XF:DET:cam1:Manufacturer_RBV" = "Simulated"
//! ```
//!
//! With `seed_defaults` (the default) every point a listed plugin or the
//! camera reads is seeded if the description leaves it out.

use crate::core::error_handling::ContextualError;
use crate::plugin::api::{
    AreaDetector, Plugin, PluginClass, PluginDiscovery, PluginError, PluginSettings,
    SharedPluginRegistry, CAMERA_CONFIG_ATTRS, DEFAULT_CAMERA_SUFFIX,
};
use crate::point::api::{MemoryServer, PointValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CAMERA_PORT: &str = "CAM";

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Error reading simulation file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing simulation file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Plugin {attr:?} names unknown class {class:?}")]
    UnknownClass { attr: String, class: String },

    #[error("The {command} command needs a simulation file (--sim FILE)")]
    NoSimulation { command: String },

    #[error("Detector {detector:?} has no plugin named {name:?}")]
    NoSuchPlugin { detector: String, name: String },

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl ContextualError for SimError {
    fn is_user_actionable(&self) -> bool {
        match self {
            SimError::Read { .. } => false,
            SimError::Parse { .. }
            | SimError::UnknownClass { .. }
            | SimError::NoSimulation { .. }
            | SimError::NoSuchPlugin { .. } => true,
            SimError::Plugin(e) => e.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SimError::Read { .. } => None,
            SimError::Parse { .. } => Some("Simulation file is not valid"),
            SimError::UnknownClass { .. } => {
                Some("Simulation file names a plugin class that is not registered")
            }
            SimError::NoSimulation { .. } => Some("Pass a simulated detector with --sim FILE"),
            SimError::NoSuchPlugin { .. } => Some("No plugin with that name in the simulation"),
            SimError::Plugin(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorSpec {
    pub name: String,
    pub prefix: String,
    #[serde(default = "default_camera_suffix")]
    pub camera_suffix: String,
    #[serde(default = "default_camera_port")]
    pub camera_port: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSpec {
    /// Attribute name under the detector (`stats1`)
    pub attr: String,
    /// Prefix suffix under the detector prefix (`Stats1:`)
    pub suffix: String,
    /// Class name or plugin type; discovered when absent
    pub class: Option<String>,
    /// Port this plugin publishes on; defaults to the upper-cased attribute
    pub port: Option<String>,
    /// Port this plugin consumes; defaults to the camera port
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    pub detector: DetectorSpec,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
    /// Values seeded as-is
    #[serde(default)]
    pub points: BTreeMap<String, PointValue>,
    /// Values seeded on both the setpoint and its `_RBV` readback
    #[serde(default)]
    pub setpoints: BTreeMap<String, PointValue>,
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

fn default_camera_suffix() -> String {
    DEFAULT_CAMERA_SUFFIX.to_string()
}

fn default_camera_port() -> String {
    DEFAULT_CAMERA_PORT.to_string()
}

fn default_true() -> bool {
    true
}

fn seed_if_absent(server: &MemoryServer, name: &str, value: impl Into<PointValue>) {
    if server.value(name).is_none() {
        server.seed(name, value);
    }
}

fn seed_pair_if_absent(server: &MemoryServer, name: &str, value: impl Into<PointValue>) {
    let value = value.into();
    seed_if_absent(server, name, value.clone());
    seed_if_absent(server, &format!("{name}_RBV"), value);
}

impl Simulation {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub async fn load(path: &Path) -> Result<Self, SimError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SimError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&contents).map_err(|source| SimError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn camera_prefix(&self) -> String {
        format!("{}{}", self.detector.prefix, self.detector.camera_suffix)
    }

    fn seed_explicit(&self, server: &MemoryServer) {
        for (name, value) in &self.points {
            server.seed(name, value.clone());
        }
        for (name, value) in &self.setpoints {
            server.seed_with_readback(name, value.clone());
        }
    }

    fn seed_camera_defaults(&self, server: &MemoryServer) {
        let prefix = self.camera_prefix();
        seed_if_absent(
            server,
            &format!("{prefix}PortName_RBV"),
            self.detector.camera_port.as_str(),
        );
        // Setpoint pairs go first so their readbacks carry the real defaults
        seed_pair_if_absent(server, &format!("{prefix}ArrayCallbacks"), 0);
        for (suffix, value) in [
            ("ImageMode", PointValue::from("Continuous")),
            ("TriggerMode", PointValue::from("Internal")),
            ("AcquireTime", PointValue::Float(0.1)),
            ("AcquirePeriod", PointValue::Float(0.1)),
        ] {
            seed_pair_if_absent(server, &format!("{prefix}{suffix}"), value);
        }
        seed_if_absent(server, &format!("{prefix}Acquire"), 0);
        for attr in CAMERA_CONFIG_ATTRS {
            seed_if_absent(server, &format!("{prefix}{}", attr.suffix), 0);
        }
    }

    fn seed_plugin_defaults(&self, server: &MemoryServer, spec: &PluginSpec, class: &PluginClass) {
        let prefix = format!("{}{}", self.detector.prefix, spec.suffix);
        let port = spec.port.clone().unwrap_or_else(|| spec.attr.to_uppercase());
        let source = spec
            .source
            .clone()
            .unwrap_or_else(|| self.detector.camera_port.clone());

        seed_if_absent(server, &format!("{prefix}PortName_RBV"), port);
        seed_if_absent(server, &format!("{prefix}NDArrayPort_RBV"), source);
        if let Some(plugin_type) = class.plugin_type {
            seed_if_absent(server, &format!("{prefix}PluginType_RBV"), plugin_type);
        }
        seed_pair_if_absent(server, &format!("{prefix}EnableCallbacks"), 0);
        seed_pair_if_absent(server, &format!("{prefix}BlockingCallbacks"), "No");
        for attr in class.configuration_attrs() {
            seed_if_absent(server, &format!("{prefix}{}", attr.suffix), 0);
        }
    }

    fn named_class(
        registry: &SharedPluginRegistry,
        spec: &PluginSpec,
        class: &str,
    ) -> Result<&'static PluginClass, SimError> {
        registry
            .class_for_type(class)
            .or_else(|| registry.classes().into_iter().find(|c| c.name == class))
            .ok_or_else(|| SimError::UnknownClass {
                attr: spec.attr.clone(),
                class: class.to_string(),
            })
    }

    /// Seed a fresh server and attach every listed plugin
    pub async fn build(
        &self,
        settings: &PluginSettings,
    ) -> Result<(MemoryServer, AreaDetector), SimError> {
        let server = MemoryServer::new();
        self.seed_explicit(&server);
        if self.seed_defaults {
            self.seed_camera_defaults(&server);
        }

        let detector = AreaDetector::with_camera_suffix(
            self.detector.name.as_str(),
            self.detector.prefix.as_str(),
            &self.detector.camera_suffix,
            Arc::new(server.clone()),
        );
        detector.set_plugin_settings(settings.clone());
        let discovery =
            PluginDiscovery::new(Arc::new(server.clone())).with_settings(settings.clone());

        for spec in &self.plugins {
            let class = match &spec.class {
                Some(class) => Self::named_class(discovery.registry(), spec, class)?,
                None => {
                    let prefix = format!("{}{}", self.detector.prefix, spec.suffix);
                    discovery.plugin_class_for_or_query(&prefix, None).await?
                }
            };
            if self.seed_defaults {
                self.seed_plugin_defaults(&server, spec, class);
            }
            detector.add_plugin(&spec.attr, &spec.suffix, class);
        }

        log::info!(
            "Simulated detector {} with {} plugin(s) over {} points",
            self.detector.name,
            self.plugins.len(),
            server.point_names().len()
        );
        Ok((server, detector))
    }
}

/// Find a plugin by attribute or device name
pub fn find_plugin(detector: &AreaDetector, name: &str) -> Result<Arc<Plugin>, SimError> {
    detector.plugin(name).ok_or_else(|| SimError::NoSuchPlugin {
        detector: detector.name().to_string(),
        name: name.to_string(),
    })
}
