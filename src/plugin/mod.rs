//! Plugin System Module
//!
//! Area-detector plugin classes and instances: type validation, pipeline
//! resolution, staging, discovery and the composite region and file-writer
//! operations.

// Internal modules - all access should go through api module
pub(crate) mod base;
pub(crate) mod builtin;
pub(crate) mod camera;
pub(crate) mod chain;
pub(crate) mod detector;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod readings;
pub(crate) mod registry;
pub(crate) mod roi;
pub(crate) mod settings;
pub(crate) mod staging;
pub(crate) mod type_check;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
