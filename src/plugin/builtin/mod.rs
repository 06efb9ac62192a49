//! Built-in Plugin Classes
//!
//! Descriptors for every plugin class that ships with the system. They are
//! registered into the default registry on first use.

pub mod api;
pub mod file;
pub mod processing;

pub use api::{builtin_classes, BASE_CONFIG_ATTRS};
pub use file::{
    FILE_CONFIG_ATTRS, FILE_PLUGIN, HDF5_PLUGIN, JPEG_PLUGIN, MAGICK_PLUGIN, NETCDF_PLUGIN,
    NEXUS_PLUGIN, TIFF_PLUGIN,
};
pub use processing::{
    COLOR_CONV_PLUGIN, IMAGE_PLUGIN, OVERLAY_PLUGIN, PROCESS_PLUGIN, ROI_PLUGIN, STATS_PLUGIN,
    TRANSFORM_PLUGIN,
};
