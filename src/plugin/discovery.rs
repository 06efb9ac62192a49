//! Plugin Discovery
//!
//! Identifies the plugin class for a remote prefix, first by recognition
//! pattern and then, if no pattern matches, by reading the type the server
//! reports for that prefix.

use crate::plugin::base::{Plugin, PLUGIN_TYPE_SUFFIX};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::registry::SharedPluginRegistry;
use crate::plugin::settings::PluginSettings;
use crate::plugin::types::{PluginClass, PluginOptions};
use crate::point::api::{PointError, PointProvider};
use std::sync::Arc;
use std::time::Duration;

/// Type identifier from a reported type string (`"NDPluginStats 1.9.1"` -> `"NDPluginStats"`)
pub(crate) fn type_identifier(reported: &str) -> &str {
    reported
        .split_once(' ')
        .map_or(reported, |(identifier, _)| identifier)
}

/// Discovery service bound to a registry and a point provider
#[derive(Debug, Clone)]
pub struct PluginDiscovery {
    registry: SharedPluginRegistry,
    provider: Arc<dyn PointProvider>,
    settings: PluginSettings,
}

impl PluginDiscovery {
    /// Discovery against the process-wide registry
    pub fn new(provider: Arc<dyn PointProvider>) -> Self {
        Self {
            registry: SharedPluginRegistry::global(),
            provider,
            settings: PluginSettings::default(),
        }
    }

    pub fn with_registry(mut self, registry: SharedPluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_settings(mut self, settings: PluginSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &SharedPluginRegistry {
        &self.registry
    }

    /// Pattern-only lookup; never touches the network
    pub fn plugin_class_for(&self, prefix: &str) -> Option<&'static PluginClass> {
        self.registry.plugin_class_for(prefix)
    }

    /// Pattern lookup, falling back to reading `{prefix}PluginType_RBV`.
    ///
    /// `timeout` defaults to the configured discovery deadline.
    pub async fn plugin_class_for_or_query(
        &self,
        prefix: &str,
        timeout: Option<Duration>,
    ) -> PluginResult<&'static PluginClass> {
        if let Some(class) = self.plugin_class_for(prefix) {
            log::debug!("{} matched {} by pattern", prefix, class.name);
            return Ok(class);
        }

        let timeout = timeout.unwrap_or_else(|| self.settings.discovery_timeout());
        let reported = self.query_plugin_type(prefix, timeout).await?;
        let identifier = type_identifier(&reported);
        let class = self.registry.class_for_type(identifier).ok_or_else(|| {
            PluginError::UnresolvableType {
                prefix: prefix.to_string(),
                reason: format!("no class registered for plugin type {identifier:?}"),
            }
        })?;
        log::debug!("{} identified as {} by query ({})", prefix, class.name, reported);
        Ok(class)
    }

    /// Read the type string the server reports for `prefix`
    pub async fn query_plugin_type(&self, prefix: &str, timeout: Duration) -> PluginResult<String> {
        let point = self.provider.point(&format!("{prefix}{PLUGIN_TYPE_SUFFIX}"));
        let read = async {
            point.wait_for_connection(timeout).await?;
            point.get().await
        };
        let timed_out = || PluginError::Timeout {
            operation: format!("plugin type query for {prefix}"),
            deadline: timeout,
        };

        match tokio::time::timeout(timeout, read).await {
            Ok(Ok(value)) => Ok(value.to_string()),
            Ok(Err(PointError::Timeout { .. })) | Err(_) => Err(timed_out()),
            Ok(Err(e)) => Err(PluginError::UnresolvableType {
                prefix: prefix.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Construct a standalone plugin of whatever class the prefix resolves to
    pub async fn plugin_instance_for(
        &self,
        prefix: &str,
        options: PluginOptions,
    ) -> PluginResult<Arc<Plugin>> {
        let class = self.plugin_class_for_or_query(prefix, None).await?;
        Ok(Plugin::new(class, prefix, Arc::clone(&self.provider), options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_identifier_splits_on_first_space() {
        assert_eq!(type_identifier("NDPluginStats 1.9.1"), "NDPluginStats");
        assert_eq!(type_identifier("NDFileHDF5"), "NDFileHDF5");
        assert_eq!(type_identifier(""), "");
    }
}
