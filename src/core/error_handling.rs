//! Generic error handling utilities
//!
//! Provides unified error reporting that works across the point and plugin
//! error types while keeping operator-facing messages short.

/// Trait for errors that can distinguish between operator-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`. When it returns `false`, `user_message()` returns `None`.
///
/// Operator-actionable examples:
/// - A plugin class wired onto a prefix the server reports as another type
/// - A prefix whose plugin type cannot be resolved
/// - Invalid region or configuration values
///
/// System examples:
/// - Unreachable or destroyed remote points
/// - Timeouts waiting on the control-system server
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the operator can act on directly
    fn is_user_actionable(&self) -> bool;

    /// Returns the operator message if this is an actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// Actionable errors log their own message; system errors log the operation
/// context. Full detail is always available at debug level.
///
/// # Examples
/// ```rust,no_run
/// # use adpipeline::core::error_handling::log_error_with_context;
/// # use adpipeline::plugin::api::PluginError;
/// let err = PluginError::Detached { prefix: "XF:DET:Stats1:".to_string() };
/// log_error_with_context(&err, "Resolving pipeline");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    if error.is_user_actionable() {
        if let Some(user_msg) = error.user_message() {
            log::error!("FATAL: {}", user_msg);
        } else {
            log::error!("FATAL: {}", operation_context);
        }
    } else {
        log::error!("FATAL: {}: {}", operation_context, error);
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
