//! Area Detector Device Tree
//!
//! The root pipeline object: a camera node plus named plugins. Plugins keep
//! only a weak handle back to the tree, so dropping the detector
//! invalidates every pipeline query made through them.

use crate::core::sync::recover_lock;
use crate::plugin::base::Plugin;
use crate::plugin::camera::{Camera, DEFAULT_CAMERA_SUFFIX};
use crate::plugin::chain::PipelineNode;
use crate::plugin::discovery::PluginDiscovery;
use crate::plugin::error::PluginResult;
use crate::plugin::settings::PluginSettings;
use crate::plugin::staging::{stage_all, unstage_all, DeactivationReport};
use crate::plugin::types::{PluginClass, PluginOptions};
use crate::point::api::PointProvider;
use std::sync::{Arc, RwLock};

/// Shared state behind an `AreaDetector`
pub struct DetectorShared {
    name: String,
    prefix: String,
    camera: Arc<Camera>,
    provider: Arc<dyn PointProvider>,
    settings: RwLock<PluginSettings>,
    plugins: RwLock<Vec<Arc<Plugin>>>,
}

impl std::fmt::Debug for DetectorShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorShared")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl DetectorShared {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera(&self) -> Arc<Camera> {
        Arc::clone(&self.camera)
    }

    pub fn plugins(&self) -> Vec<Arc<Plugin>> {
        recover_lock(self.plugins.read()).clone()
    }

    /// Camera first, then plugins in attachment order
    pub(crate) fn pipeline_nodes(&self) -> PluginResult<Vec<Arc<dyn PipelineNode>>> {
        let camera: Arc<dyn PipelineNode> = self.camera();
        let mut nodes = vec![camera];
        for plugin in self.plugins() {
            nodes.push(plugin.as_node()?);
        }
        Ok(nodes)
    }
}

/// An area detector: camera root plus its plugin pipeline
#[derive(Debug, Clone)]
pub struct AreaDetector {
    shared: Arc<DetectorShared>,
}

impl AreaDetector {
    /// Detector with its camera at the default `cam1:` suffix
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        provider: Arc<dyn PointProvider>,
    ) -> Self {
        Self::with_camera_suffix(name, prefix, DEFAULT_CAMERA_SUFFIX, provider)
    }

    pub fn with_camera_suffix(
        name: impl Into<String>,
        prefix: impl Into<String>,
        camera_suffix: &str,
        provider: Arc<dyn PointProvider>,
    ) -> Self {
        let name = name.into();
        let prefix = prefix.into();
        let camera = Camera::new(
            format!("{name}_cam"),
            format!("{prefix}{camera_suffix}"),
            Arc::clone(&provider),
        );
        Self {
            shared: Arc::new(DetectorShared {
                name,
                prefix,
                camera: Arc::new(camera),
                provider,
                settings: RwLock::new(PluginSettings::default()),
                plugins: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Settings handed to plugins attached from now on
    pub fn set_plugin_settings(&self, settings: PluginSettings) {
        *recover_lock(self.shared.settings.write()) = settings;
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn prefix(&self) -> &str {
        &self.shared.prefix
    }

    pub fn camera(&self) -> Arc<Camera> {
        self.shared.camera()
    }

    /// Attach a plugin of a known class at `{prefix}{suffix}`, named
    /// `{detector}_{attr}`
    pub fn add_plugin(&self, attr: &str, suffix: &str, class: &'static PluginClass) -> Arc<Plugin> {
        let options = PluginOptions {
            name: Some(format!("{}_{}", self.shared.name, attr)),
            settings: recover_lock(self.shared.settings.read()).clone(),
        };
        let plugin = Plugin::attached(
            class,
            format!("{}{}", self.shared.prefix, suffix),
            Arc::clone(&self.shared.provider),
            options,
            Arc::downgrade(&self.shared),
            &self.shared.camera,
        );
        recover_lock(self.shared.plugins.write()).push(Arc::clone(&plugin));
        log::debug!(
            "Attached {} ({}) to detector {}",
            plugin.name(),
            class.name,
            self.shared.name
        );
        plugin
    }

    /// Attach a plugin whose class is found by pattern or live query
    pub async fn add_discovered_plugin(
        &self,
        attr: &str,
        suffix: &str,
        discovery: &PluginDiscovery,
    ) -> PluginResult<Arc<Plugin>> {
        let prefix = format!("{}{}", self.shared.prefix, suffix);
        let class = discovery.plugin_class_for_or_query(&prefix, None).await?;
        Ok(self.add_plugin(attr, suffix, class))
    }

    pub fn plugins(&self) -> Vec<Arc<Plugin>> {
        self.shared.plugins()
    }

    /// Plugin by attribute name (`stats1`) or full device name (`det_stats1`)
    pub fn plugin(&self, attr: &str) -> Option<Arc<Plugin>> {
        let full = format!("{}_{}", self.shared.name, attr);
        self.plugins()
            .into_iter()
            .find(|plugin| plugin.name() == full || plugin.name() == attr)
    }

    /// Stage every plugin in attachment order
    pub async fn stage(&self) -> PluginResult<()> {
        stage_all(&self.plugins()).await
    }

    /// Unstage every plugin in reverse attachment order
    pub async fn unstage(&self) -> Vec<DeactivationReport> {
        unstage_all(&self.plugins()).await
    }
}
