//! API for built-in class registration
//!
//! The built-in classes are listed explicitly here in registration order;
//! that order decides which class wins when several patterns match a prefix.

use crate::plugin::builtin::file::{
    HDF5_PLUGIN, JPEG_PLUGIN, MAGICK_PLUGIN, NETCDF_PLUGIN, NEXUS_PLUGIN, TIFF_PLUGIN,
};
use crate::plugin::builtin::processing::{
    COLOR_CONV_PLUGIN, IMAGE_PLUGIN, OVERLAY_PLUGIN, PROCESS_PLUGIN, ROI_PLUGIN, STATS_PLUGIN,
    TRANSFORM_PLUGIN,
};
use crate::plugin::types::{ConfigAttr, PluginClass};

/// Configuration shared by every plugin
pub const BASE_CONFIG_ATTRS: &[ConfigAttr] = &[
    ConfigAttr::new("port_name", "PortName_RBV"),
    ConfigAttr::new("blocking_callbacks", "BlockingCallbacks_RBV"),
    ConfigAttr::new("enable", "EnableCallbacks_RBV"),
    ConfigAttr::new("nd_array_port", "NDArrayPort_RBV"),
    ConfigAttr::new("plugin_type", "PluginType_RBV"),
];

/// All registrable built-in classes, in registration order.
///
/// The abstract file class is absent: it has no recognition pattern and is
/// only used as a base for the concrete writers.
pub fn builtin_classes() -> Vec<&'static PluginClass> {
    vec![
        &IMAGE_PLUGIN,
        &STATS_PLUGIN,
        &COLOR_CONV_PLUGIN,
        &PROCESS_PLUGIN,
        &OVERLAY_PLUGIN,
        &ROI_PLUGIN,
        &TRANSFORM_PLUGIN,
        &NETCDF_PLUGIN,
        &TIFF_PLUGIN,
        &JPEG_PLUGIN,
        &NEXUS_PLUGIN,
        &HDF5_PLUGIN,
        &MAGICK_PLUGIN,
    ]
}
