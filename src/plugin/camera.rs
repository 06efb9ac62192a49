//! Camera driver node: the root of every array pipeline

use crate::plugin::chain::PipelineNode;
use crate::plugin::error::PluginResult;
use crate::plugin::readings::{
    configuration_names, configuration_names_field, describe_attrs, list_description,
    list_reading, read_attrs,
};
use crate::plugin::types::{ConfigAttr, Configuration, SignalRef};
use crate::point::api::{PointProvider, RemotePoint};
use std::sync::Arc;

pub const DEFAULT_CAMERA_SUFFIX: &str = "cam1:";

pub const CAMERA_CONFIG_ATTRS: &[ConfigAttr] = &[
    ConfigAttr::new("port_name", "PortName_RBV"),
    ConfigAttr::new("manufacturer", "Manufacturer_RBV"),
    ConfigAttr::new("model", "Model_RBV"),
    ConfigAttr::new("acquire_time", "AcquireTime_RBV"),
    ConfigAttr::new("acquire_period", "AcquirePeriod_RBV"),
    ConfigAttr::new("image_mode", "ImageMode_RBV"),
    ConfigAttr::new("trigger_mode", "TriggerMode_RBV"),
];

/// Image-producing driver at the head of the pipeline
pub struct Camera {
    name: String,
    prefix: String,
    provider: Arc<dyn PointProvider>,
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Camera {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        provider: Arc<dyn PointProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            provider,
        }
    }

    pub fn point(&self, suffix: &str) -> Arc<dyn RemotePoint> {
        self.provider.point(&format!("{}{}", self.prefix, suffix))
    }

    /// Setpoint/readback pair under this camera's prefix
    pub fn signal(&self, suffix: &str) -> SignalRef {
        SignalRef::with_readback(format!("{}{}", self.prefix, suffix))
    }

    pub fn array_callbacks(&self) -> SignalRef {
        self.signal("ArrayCallbacks")
    }
}

#[async_trait::async_trait]
impl PipelineNode for Camera {
    fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn port_name(&self) -> PluginResult<String> {
        Ok(self.point("PortName_RBV").get().await?.to_string())
    }

    async fn source_port(&self) -> PluginResult<Option<String>> {
        Ok(None)
    }

    async fn read_configuration(&self) -> PluginResult<Configuration> {
        let mut config = read_attrs(
            self.provider.as_ref(),
            &self.name,
            &self.prefix,
            CAMERA_CONFIG_ATTRS,
        )
        .await?;
        let names = configuration_names(&self.name, CAMERA_CONFIG_ATTRS);
        config.insert(configuration_names_field(&self.name), list_reading(&names));
        Ok(config)
    }

    async fn describe_configuration(&self) -> PluginResult<Configuration> {
        let mut config = describe_attrs(
            self.provider.as_ref(),
            &self.name,
            &self.prefix,
            CAMERA_CONFIG_ATTRS,
        )
        .await?;
        let field = configuration_names_field(&self.name);
        let names = configuration_names(&self.name, CAMERA_CONFIG_ATTRS);
        config.insert(field.clone(), list_description(&field, &names));
        Ok(config)
    }
}
