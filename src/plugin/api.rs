//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Plugin instances and the detector tree
pub use crate::plugin::base::Plugin;
pub use crate::plugin::camera::{Camera, CAMERA_CONFIG_ATTRS, DEFAULT_CAMERA_SUFFIX};
pub use crate::plugin::detector::{AreaDetector, DetectorShared};

// Error handling
pub use crate::plugin::error::{PluginError, PluginResult};

// Class descriptors and shared types
pub use crate::plugin::builtin::{
    builtin_classes, BASE_CONFIG_ATTRS, COLOR_CONV_PLUGIN, FILE_CONFIG_ATTRS, FILE_PLUGIN,
    HDF5_PLUGIN, IMAGE_PLUGIN, JPEG_PLUGIN, MAGICK_PLUGIN, NETCDF_PLUGIN, NEXUS_PLUGIN,
    OVERLAY_PLUGIN, PROCESS_PLUGIN, ROI_PLUGIN, STATS_PLUGIN, TIFF_PLUGIN, TRANSFORM_PLUGIN,
};
pub use crate::plugin::types::{
    ConfigAttr, Configuration, PluginClass, PluginFamily, PluginOptions, SignalRef, TypeState,
};

// Registry and discovery
pub use crate::plugin::discovery::PluginDiscovery;
pub use crate::plugin::registry::{PluginRegistry, SharedPluginRegistry};

// Pipeline resolution
pub use crate::plugin::chain::PipelineNode;

// Staging
pub use crate::plugin::staging::{
    stage_all, unstage_all, DeactivationReport, StageDirectives, StageSnapshot,
};

// Composite operations
pub use crate::plugin::file::FileWriteMode;
pub use crate::plugin::roi::{parse_region, Axis, AxisSpan, PointWrite, Region, RegionStatus};

// Settings
pub use crate::plugin::settings::{PluginSettings, DEFAULT_DISCOVERY_TIMEOUT};
