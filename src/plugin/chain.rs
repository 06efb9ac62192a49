//! Pipeline Resolution
//!
//! Walks source-port references upstream from a plugin to the pipeline root
//! and builds the merged configuration views on top of the resulting chain.
//! Nothing is cached: the port index is rebuilt from live reads on every
//! query.

use crate::plugin::base::Plugin;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::Configuration;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A node in an array pipeline: the camera root or a plugin
#[async_trait::async_trait]
pub trait PipelineNode: Send + Sync + std::fmt::Debug {
    /// Device name; prefixes every configuration field of this node
    fn name(&self) -> &str;

    /// Remote point prefix
    fn prefix(&self) -> &str;

    /// Array port this node publishes on
    async fn port_name(&self) -> PluginResult<String>;

    /// Port this node consumes from; `None` for the pipeline root
    async fn source_port(&self) -> PluginResult<Option<String>>;

    /// This node's own configuration readings
    async fn read_configuration(&self) -> PluginResult<Configuration>;

    /// Descriptions matching `read_configuration`
    async fn describe_configuration(&self) -> PluginResult<Configuration>;

    /// Label identifying this node's configuration in merged views
    fn configuration_names_field(&self) -> String {
        crate::plugin::readings::configuration_names_field(self.name())
    }
}

/// Port name to owning node, built fresh for a single query
pub(crate) struct PortIndex {
    root: String,
    nodes: HashMap<String, Arc<dyn PipelineNode>>,
}

impl PortIndex {
    /// Read every node's port name. When two nodes claim the same port the
    /// first in `nodes` order keeps it.
    pub(crate) async fn build(
        root: &str,
        nodes: Vec<Arc<dyn PipelineNode>>,
    ) -> PluginResult<Self> {
        let mut index: HashMap<String, Arc<dyn PipelineNode>> =
            HashMap::with_capacity(nodes.len());
        for node in nodes {
            let port = node.port_name().await?;
            if let Some(owner) = index.get(&port) {
                log::warn!(
                    "Port {} claimed by both {} and {}; keeping {}",
                    port,
                    owner.name(),
                    node.name(),
                    owner.name()
                );
                continue;
            }
            index.insert(port, node);
        }
        Ok(Self {
            root: root.to_string(),
            nodes: index,
        })
    }

    pub(crate) fn lookup(&self, port: &str) -> PluginResult<Arc<dyn PipelineNode>> {
        self.nodes
            .get(port)
            .cloned()
            .ok_or_else(|| PluginError::PortNotFound {
                root: self.root.clone(),
                port: port.to_string(),
            })
    }

    /// Ordered chain from the root down to `start` (inclusive)
    pub(crate) async fn resolve(
        &self,
        start: Arc<dyn PipelineNode>,
    ) -> PluginResult<Vec<Arc<dyn PipelineNode>>> {
        let mut visited = HashSet::from([start.prefix().to_string()]);
        let mut chain = vec![Arc::clone(&start)];
        let mut current = start;

        while let Some(port) = current.source_port().await? {
            let upstream = self.lookup(&port)?;
            if !visited.insert(upstream.prefix().to_string()) {
                let walked = chain.iter().rev().map(|n| n.name().to_string()).collect();
                return Err(PluginError::PipelineCycle { port, walked });
            }
            chain.push(Arc::clone(&upstream));
            current = upstream;
        }

        chain.reverse();
        Ok(chain)
    }
}

impl Plugin {
    async fn port_index(&self) -> PluginResult<PortIndex> {
        let root = self.root()?;
        PortIndex::build(root.name(), root.pipeline_nodes()?).await
    }

    /// Ordered chain from the pipeline root down to this plugin
    pub async fn pipeline(&self) -> PluginResult<Vec<Arc<dyn PipelineNode>>> {
        let index = self.port_index().await?;
        index.resolve(self.as_node()?).await
    }

    /// The node this plugin takes its arrays from
    pub async fn source_plugin(&self) -> PluginResult<Arc<dyn PipelineNode>> {
        let index = self.port_index().await?;
        let port = self.read_source_port().await?;
        index.lookup(&port)
    }

    /// Configuration-name labels of every node in the pipeline, root first
    pub async fn pipeline_configuration_names(&self) -> PluginResult<Vec<String>> {
        Ok(self
            .pipeline()
            .await?
            .iter()
            .map(|node| node.configuration_names_field())
            .collect())
    }

    /// This plugin's configuration merged with every ancestor's; on key
    /// collision the node closer to this plugin wins.
    pub async fn merged_configuration(&self) -> PluginResult<Configuration> {
        let mut merged = Configuration::new();
        for node in self.pipeline().await? {
            merged.extend(node.read_configuration().await?);
        }
        Ok(merged)
    }

    /// Descriptions for `merged_configuration`, merged the same way
    pub async fn merged_description(&self) -> PluginResult<Configuration> {
        let mut merged = Configuration::new();
        for node in self.pipeline().await? {
            merged.extend(node.describe_configuration().await?);
        }
        Ok(merged)
    }
}
