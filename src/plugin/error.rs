//! Plugin Error Handling
//!
//! Error types for plugin discovery, type validation, pipeline resolution
//! and staging. Remote point failures are folded in through `From<PointError>`.

use crate::point::error::PointError;
use std::time::Duration;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// The server reports a different plugin type than the class expects
    #[error(
        "Plugin prefix {prefix:?}: trying to use {class:?} class (with plugin type={expected:?}) \
         but the plugin reports it is of type {reported:?}"
    )]
    ConfigurationMismatch {
        prefix: String,
        class: String,
        expected: String,
        reported: String,
    },

    /// A remote point is unreachable or refused an operation
    #[error("Communication failure on {point}: {cause}")]
    Communication { point: String, cause: String },

    /// The point or device tree behind a handle has been torn down
    #[error("{what} has been destroyed")]
    Destroyed { what: String },

    /// A bounded wait exceeded its deadline
    #[error("Timed out after {deadline:?} during {operation}")]
    Timeout {
        operation: String,
        deadline: Duration,
    },

    /// Neither pattern nor live-query discovery identified the plugin
    #[error("Unable to determine plugin type for {prefix:?}: {reason}")]
    UnresolvableType { prefix: String, reason: String },

    /// No node in the pipeline owns the named port
    #[error("No plugin in {root:?} owns array port {port:?}")]
    PortNotFound { root: String, port: String },

    /// Source-port references loop back on themselves
    #[error("Source port cycle detected at {port:?} (walked: {walked:?})")]
    PipelineCycle { port: String, walked: Vec<String> },

    /// The plugin is not part of any detector device tree
    #[error("Plugin {prefix:?} is not attached to a detector")]
    Detached { prefix: String },

    /// A class recognition pattern failed to compile
    #[error("Invalid recognition pattern {pattern:?} for {class}: {cause}")]
    InvalidPattern {
        class: String,
        pattern: String,
        cause: String,
    },

    /// Bad region-of-interest request
    #[error("Invalid region: {reason}")]
    InvalidRegion { reason: String },

    /// A failed activation left points changed that were never restored
    #[error("Plugin {prefix:?} holds a partial activation; deactivate before retrying")]
    PartialActivation { prefix: String },

    /// Operation not offered by this plugin class
    #[error("{class} does not support {operation}")]
    Unsupported { class: String, operation: String },
}

impl PluginError {
    /// Whether this is a type disagreement rather than a communication problem
    pub fn is_mismatch(&self) -> bool {
        matches!(self, PluginError::ConfigurationMismatch { .. })
    }
}

impl From<PointError> for PluginError {
    fn from(err: PointError) -> Self {
        match err {
            PointError::Destroyed { name } => PluginError::Destroyed {
                what: format!("Point {name}"),
            },
            PointError::Timeout {
                name,
                operation,
                timeout,
            } => PluginError::Timeout {
                operation: format!("{operation} on {name}"),
                deadline: timeout,
            },
            other => PluginError::Communication {
                point: other.point_name().to_string(),
                cause: other.to_string(),
            },
        }
    }
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            PluginError::ConfigurationMismatch { .. }
                | PluginError::UnresolvableType { .. }
                | PluginError::PortNotFound { .. }
                | PluginError::PipelineCycle { .. }
                | PluginError::Detached { .. }
                | PluginError::InvalidPattern { .. }
                | PluginError::InvalidRegion { .. }
                | PluginError::Unsupported { .. }
                | PluginError::PartialActivation { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::ConfigurationMismatch { .. } => {
                Some("Plugin class does not match the type reported by the server")
            }
            PluginError::UnresolvableType { .. } => {
                Some("Could not determine the plugin type for the given prefix")
            }
            PluginError::PortNotFound { .. } => {
                Some("A plugin references an array port that no pipeline node owns")
            }
            PluginError::PipelineCycle { .. } => {
                Some("Plugin source ports form a cycle; check NDArrayPort settings")
            }
            PluginError::Detached { .. } => Some("Plugin is not attached to a detector"),
            PluginError::InvalidPattern { .. } => Some("A plugin recognition pattern is invalid"),
            PluginError::InvalidRegion { .. } => Some("Invalid region-of-interest request"),
            PluginError::PartialActivation { .. } => {
                Some("Deactivate the plugin to restore its previous settings, then retry")
            }
            PluginError::Unsupported { .. } => {
                Some("Operation is not available for this plugin class")
            }
            _ => None,
        }
    }
}
