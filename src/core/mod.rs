//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod styles; // terminal palette for CLI tables and help
pub mod sync;
pub mod version;
pub mod wait;
