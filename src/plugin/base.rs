//! Plugin Base
//!
//! One area-detector plugin instance: its class, its remote prefix, its
//! type-validation state and the directives applied when it is staged.

use crate::core::sync::recover_lock;
use crate::plugin::camera::Camera;
use crate::plugin::chain::PipelineNode;
use crate::plugin::detector::DetectorShared;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::readings::{
    configuration_names, configuration_names_field, describe_attrs, list_description,
    list_reading, read_attrs,
};
use crate::plugin::settings::PluginSettings;
use crate::plugin::staging::{StageDirectives, StageSnapshot};
use crate::plugin::types::{Configuration, PluginClass, PluginOptions, SignalRef, TypeState};
use crate::point::api::{ConnectionSubscription, PointProvider, PointValue, RemotePoint};
use std::sync::{Arc, Mutex, Weak};

pub(crate) const PLUGIN_TYPE_SUFFIX: &str = "PluginType_RBV";
const PORT_NAME_SUFFIX: &str = "PortName_RBV";
const SOURCE_PORT_SUFFIX: &str = "NDArrayPort_RBV";
const ENABLE_SUFFIX: &str = "EnableCallbacks";
const BLOCKING_SUFFIX: &str = "BlockingCallbacks";

/// A plugin instance bound to a remote prefix
pub struct Plugin {
    name: String,
    prefix: String,
    class: &'static PluginClass,
    provider: Arc<dyn PointProvider>,
    settings: PluginSettings,
    pub(crate) type_state: Mutex<TypeState>,
    stage_sigs: Mutex<StageDirectives>,
    pub(crate) staged: tokio::sync::Mutex<Option<StageSnapshot>>,
    root: Option<Weak<DetectorShared>>,
    this: Weak<Plugin>,
    pub(crate) type_watch: Mutex<Option<ConnectionSubscription>>,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("class", &self.class.name)
            .field("type_state", &self.type_state())
            .finish()
    }
}

/// Device name from the last non-empty prefix segment (`XF:DET:Stats1:` -> `stats1`)
fn default_name(prefix: &str) -> String {
    prefix
        .rsplit(':')
        .find(|segment| !segment.is_empty())
        .unwrap_or(prefix)
        .to_lowercase()
}

impl Plugin {
    /// Standalone plugin, not attached to any detector
    pub fn new(
        class: &'static PluginClass,
        prefix: impl Into<String>,
        provider: Arc<dyn PointProvider>,
        options: PluginOptions,
    ) -> Arc<Self> {
        Self::build(class, prefix.into(), provider, options, None, None)
    }

    pub(crate) fn attached(
        class: &'static PluginClass,
        prefix: String,
        provider: Arc<dyn PointProvider>,
        options: PluginOptions,
        root: Weak<DetectorShared>,
        camera: &Camera,
    ) -> Arc<Self> {
        Self::build(class, prefix, provider, options, Some(root), Some(camera))
    }

    fn build(
        class: &'static PluginClass,
        prefix: String,
        provider: Arc<dyn PointProvider>,
        options: PluginOptions,
        root: Option<Weak<DetectorShared>>,
        camera: Option<&Camera>,
    ) -> Arc<Self> {
        let name = options.name.unwrap_or_else(|| default_name(&prefix));
        let plugin = Arc::new_cyclic(|this| Plugin {
            name,
            prefix,
            class,
            provider,
            settings: options.settings,
            type_state: Mutex::new(TypeState::initial(class)),
            stage_sigs: Mutex::new(StageDirectives::default()),
            staged: tokio::sync::Mutex::new(None),
            root,
            this: this.clone(),
            type_watch: Mutex::new(None),
        });

        plugin.enable_on_stage();
        plugin.ensure_blocking();
        if let Some(camera) = camera {
            plugin.set_stage_directive(camera.array_callbacks(), 1);
        }
        plugin.watch_type_report();
        plugin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn class(&self) -> &'static PluginClass {
        self.class
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Point source for remote operations; fails once the owning detector
    /// has been dropped
    pub(crate) fn provider(&self) -> PluginResult<&dyn PointProvider> {
        self.ensure_live()?;
        Ok(self.provider.as_ref())
    }

    /// Handle for the point at `{prefix}{suffix}`
    pub fn point(&self, suffix: &str) -> PluginResult<Arc<dyn RemotePoint>> {
        Ok(self.provider()?.point(&format!("{}{}", self.prefix, suffix)))
    }

    /// Handle built without the liveness check, for use during construction
    pub(crate) fn unchecked_point(&self, suffix: &str) -> Arc<dyn RemotePoint> {
        self.provider.point(&format!("{}{}", self.prefix, suffix))
    }

    pub(crate) fn ensure_live(&self) -> PluginResult<()> {
        match &self.root {
            Some(root) if root.strong_count() == 0 => Err(PluginError::Destroyed {
                what: format!("Detector owning {}", self.prefix),
            }),
            _ => Ok(()),
        }
    }

    /// Setpoint/readback pair under this plugin's prefix
    pub fn signal(&self, suffix: &str) -> SignalRef {
        SignalRef::with_readback(format!("{}{}", self.prefix, suffix))
    }

    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    pub(crate) fn root(&self) -> PluginResult<Arc<DetectorShared>> {
        let root = self.root.as_ref().ok_or_else(|| PluginError::Detached {
            prefix: self.prefix.clone(),
        })?;
        root.upgrade().ok_or_else(|| PluginError::Destroyed {
            what: format!("Detector owning {}", self.prefix),
        })
    }

    /// Parent detector's camera
    pub fn camera(&self) -> PluginResult<Arc<Camera>> {
        Ok(self.root()?.camera())
    }

    pub(crate) fn as_node(&self) -> PluginResult<Arc<dyn PipelineNode>> {
        let this = self.this.upgrade().ok_or_else(|| PluginError::Destroyed {
            what: format!("Plugin {}", self.prefix),
        })?;
        Ok(this)
    }

    pub(crate) fn downgrade(&self) -> Weak<Plugin> {
        self.this.clone()
    }

    pub(crate) async fn read_source_port(&self) -> PluginResult<String> {
        Ok(self.point(SOURCE_PORT_SUFFIX)?.get().await?.to_string())
    }

    /// Integer reading of `{prefix}{suffix}`
    pub(crate) async fn read_int(&self, suffix: &str) -> PluginResult<i64> {
        let point = self.point(suffix)?;
        let value = point.get().await?;
        value.as_i64().ok_or_else(|| PluginError::Communication {
            point: point.name().to_string(),
            cause: format!("expected an integer, got {value}"),
        })
    }

    /// Total pixels in the current array; 0 when the array has no dimensions.
    ///
    /// Sizes are taken in (height, width, depth) order, so a one-dimensional
    /// array reports `ArraySize1_RBV`.
    pub async fn array_pixels(&self) -> PluginResult<i64> {
        let dimensions = self.read_int("NDimensions_RBV").await?;
        if dimensions <= 0 {
            return Ok(0);
        }
        let mut pixels = 1;
        for suffix in ["ArraySize1_RBV", "ArraySize0_RBV", "ArraySize2_RBV"]
            .iter()
            .take(dimensions as usize)
        {
            pixels *= self.read_int(suffix).await?;
        }
        Ok(pixels)
    }

    fn enable_signal(&self) -> SignalRef {
        self.signal(ENABLE_SUFFIX)
    }

    /// Current staging directives in application order
    pub fn stage_directives(&self) -> StageDirectives {
        recover_lock(self.stage_sigs.lock()).clone()
    }

    /// Add or replace a staging directive. The enable directive always
    /// stays first.
    pub fn set_stage_directive(&self, signal: SignalRef, value: impl Into<PointValue>) {
        let is_enable = signal == self.enable_signal();
        let mut directives = recover_lock(self.stage_sigs.lock());
        directives.set(signal, value);
        if is_enable {
            directives.move_to_front(&self.enable_signal().setpoint);
        }
    }

    pub fn remove_stage_directive(&self, setpoint: &str) -> Option<PointValue> {
        recover_lock(self.stage_sigs.lock()).remove(setpoint)
    }

    /// Enable the plugin when staged
    pub fn enable_on_stage(&self) {
        self.set_stage_directive(self.enable_signal(), 1);
    }

    /// Disable the plugin when staged
    pub fn disable_on_stage(&self) {
        self.set_stage_directive(self.enable_signal(), 0);
    }

    pub fn ensure_blocking(&self) {
        self.set_stage_directive(self.signal(BLOCKING_SUFFIX), "Yes");
    }

    pub fn ensure_nonblocking(&self) {
        self.set_stage_directive(self.signal(BLOCKING_SUFFIX), "No");
    }

    async fn own_configuration(&self, describe: bool) -> PluginResult<Configuration> {
        let attrs = self.class.configuration_attrs();
        let mut config = if describe {
            describe_attrs(self.provider()?, &self.name, &self.prefix, &attrs).await?
        } else {
            read_attrs(self.provider()?, &self.name, &self.prefix, &attrs).await?
        };

        let names_field = configuration_names_field(&self.name);
        let mut names = configuration_names(&self.name, &attrs);
        let pipeline_field = format!("{}_asyn_pipeline_config", self.name);
        names.push(pipeline_field.clone());
        let pipeline = match self.pipeline_configuration_names().await {
            Ok(pipeline) => pipeline,
            Err(PluginError::Detached { .. }) => vec![names_field.clone()],
            Err(e) => return Err(e),
        };

        if describe {
            config.insert(names_field.clone(), list_description(&names_field, &names));
            config.insert(
                pipeline_field.clone(),
                list_description(&pipeline_field, &pipeline),
            );
        } else {
            config.insert(names_field, list_reading(&names));
            config.insert(pipeline_field, list_reading(&pipeline));
        }
        Ok(config)
    }
}

#[async_trait::async_trait]
impl PipelineNode for Plugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn port_name(&self) -> PluginResult<String> {
        Ok(self.point(PORT_NAME_SUFFIX)?.get().await?.to_string())
    }

    async fn source_port(&self) -> PluginResult<Option<String>> {
        Ok(Some(self.read_source_port().await?))
    }

    async fn read_configuration(&self) -> PluginResult<Configuration> {
        self.own_configuration(false).await
    }

    async fn describe_configuration(&self) -> PluginResult<Configuration> {
        self.own_configuration(true).await
    }
}
