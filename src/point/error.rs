//! Remote Point Error Types

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointError {
    #[error("Point {name} is not connected: {reason}")]
    Disconnected { name: String, reason: String },

    #[error("Point {name} has been destroyed")]
    Destroyed { name: String },

    #[error("Timed out after {timeout:?} waiting for {operation} on {name}")]
    Timeout {
        name: String,
        operation: String,
        timeout: Duration,
    },

    #[error("Server rejected write to {name}: {reason}")]
    Rejected { name: String, reason: String },
}

/// Result type for remote point operations
pub type PointResult<T> = Result<T, PointError>;

impl PointError {
    /// Name of the point the error refers to
    pub fn point_name(&self) -> &str {
        match self {
            PointError::Disconnected { name, .. }
            | PointError::Destroyed { name }
            | PointError::Timeout { name, .. }
            | PointError::Rejected { name, .. } => name,
        }
    }
}

impl crate::core::error_handling::ContextualError for PointError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
