//! Test modules for the plugin system
//!
//! Scenario tests that drive plugins against the in-memory server:
//! type validation, staging, pipeline resolution, discovery and the
//! composite operations.

mod file;
mod utils;
