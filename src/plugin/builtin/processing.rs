//! Array-processing plugin classes

use crate::plugin::types::{ConfigAttr, PluginClass, PluginFamily};

pub static IMAGE_PLUGIN: PluginClass = PluginClass {
    name: "ImagePlugin",
    plugin_type: Some("NDPluginStdArrays"),
    suffix_pattern: Some(r"image\d:"),
    default_suffix: "image1:",
    html_docs: &["NDPluginStdArrays.html"],
    family: PluginFamily::Processing,
    config_attrs: &[],
};

pub static STATS_PLUGIN: PluginClass = PluginClass {
    name: "StatsPlugin",
    plugin_type: Some("NDPluginStats"),
    suffix_pattern: Some(r"Stats\d:"),
    default_suffix: "Stats1:",
    html_docs: &["NDPluginStats.html"],
    family: PluginFamily::Processing,
    config_attrs: &[
        ConfigAttr::new("bgd_width", "BgdWidth_RBV"),
        ConfigAttr::new("centroid_threshold", "CentroidThreshold_RBV"),
        ConfigAttr::new("compute_centroid", "ComputeCentroid_RBV"),
        ConfigAttr::new("compute_histogram", "ComputeHistogram_RBV"),
        ConfigAttr::new("compute_profiles", "ComputeProfiles_RBV"),
        ConfigAttr::new("compute_statistics", "ComputeStatistics_RBV"),
        ConfigAttr::new("hist_max", "HistMax_RBV"),
        ConfigAttr::new("hist_min", "HistMin_RBV"),
        ConfigAttr::new("ts_num_points", "TSNumPoints"),
    ],
};

pub static COLOR_CONV_PLUGIN: PluginClass = PluginClass {
    name: "ColorConvPlugin",
    plugin_type: Some("NDPluginColorConvert"),
    suffix_pattern: Some(r"CC\d:"),
    default_suffix: "CC1:",
    html_docs: &["NDPluginColorConvert.html"],
    family: PluginFamily::Processing,
    config_attrs: &[
        ConfigAttr::new("color_mode_out", "ColorModeOut_RBV"),
        ConfigAttr::new("false_color", "FalseColor_RBV"),
    ],
};

pub static PROCESS_PLUGIN: PluginClass = PluginClass {
    name: "ProcessPlugin",
    plugin_type: Some("NDPluginProcess"),
    suffix_pattern: Some(r"Proc\d:"),
    default_suffix: "Proc1:",
    html_docs: &["NDPluginProcess.html"],
    family: PluginFamily::Processing,
    config_attrs: &[
        ConfigAttr::new("data_type_out", "DataTypeOut_RBV"),
        ConfigAttr::new("enable_background", "EnableBackground_RBV"),
        ConfigAttr::new("enable_filter", "EnableFilter_RBV"),
        ConfigAttr::new("enable_flat_field", "EnableFlatField_RBV"),
        ConfigAttr::new("filter_type", "FilterType"),
        ConfigAttr::new("num_filter", "NumFilter_RBV"),
        ConfigAttr::new("offset", "Offset_RBV"),
        ConfigAttr::new("scale", "Scale_RBV"),
    ],
};

pub static OVERLAY_PLUGIN: PluginClass = PluginClass {
    name: "OverlayPlugin",
    plugin_type: Some("NDPluginOverlay"),
    suffix_pattern: Some(r"Over\d:"),
    default_suffix: "Over1:",
    html_docs: &["NDPluginOverlay.html"],
    family: PluginFamily::Processing,
    config_attrs: &[],
};

pub static ROI_PLUGIN: PluginClass = PluginClass {
    name: "ROIPlugin",
    plugin_type: Some("NDPluginROI"),
    suffix_pattern: Some(r"ROI\d:"),
    default_suffix: "ROI1:",
    html_docs: &["NDPluginROI.html"],
    family: PluginFamily::RegionOfInterest,
    config_attrs: &[
        ConfigAttr::new("bin_x", "BinX_RBV"),
        ConfigAttr::new("bin_y", "BinY_RBV"),
        ConfigAttr::new("bin_z", "BinZ_RBV"),
        ConfigAttr::new("data_type_out", "DataTypeOut_RBV"),
        ConfigAttr::new("enable_scale", "EnableScale_RBV"),
        ConfigAttr::new("roi_name", "Name_RBV"),
    ],
};

pub static TRANSFORM_PLUGIN: PluginClass = PluginClass {
    name: "TransformPlugin",
    plugin_type: Some("NDPluginTransform"),
    suffix_pattern: Some(r"Trans\d:"),
    default_suffix: "Trans1:",
    html_docs: &["NDPluginTransform.html"],
    family: PluginFamily::Processing,
    config_attrs: &[],
};
