//! Remote Control Point Module
//!
//! The seam between the plugin object model and the control-system server.
//! A remote point is one named value with get/put semantics and connection
//! notifications. The wire protocol lives behind `PointProvider`; this crate
//! ships an in-memory server used by tests and the simulator front end.

pub(crate) mod error;
pub(crate) mod memory;
pub(crate) mod traits;
pub(crate) mod value;

// Public API module - the only public interface for the point layer
pub mod api;
