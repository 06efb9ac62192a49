//! File-writer plugin classes

use crate::plugin::types::{ConfigAttr, PluginClass, PluginFamily};

/// Configuration shared by every file writer
pub const FILE_CONFIG_ATTRS: &[ConfigAttr] = &[
    ConfigAttr::new("auto_increment", "AutoIncrement_RBV"),
    ConfigAttr::new("auto_save", "AutoSave_RBV"),
    ConfigAttr::new("file_format", "FileFormat_RBV"),
    ConfigAttr::new("file_name", "FileName_RBV"),
    ConfigAttr::new("file_path", "FilePath_RBV"),
    ConfigAttr::new("file_template", "FileTemplate_RBV"),
    ConfigAttr::new("file_write_mode", "FileWriteMode_RBV"),
    ConfigAttr::new("full_file_name", "FullFileName_RBV"),
    ConfigAttr::new("num_capture", "NumCapture_RBV"),
];

/// Abstract base of the file writers; never registered
pub static FILE_PLUGIN: PluginClass = PluginClass {
    name: "FilePlugin",
    plugin_type: Some("NDPluginFile"),
    suffix_pattern: None,
    default_suffix: "",
    html_docs: &["NDPluginFile.html"],
    family: PluginFamily::File,
    config_attrs: &[],
};

pub static NETCDF_PLUGIN: PluginClass = PluginClass {
    name: "NetCDFPlugin",
    plugin_type: Some("NDFileNetCDF"),
    suffix_pattern: Some(r"netCDF\d:"),
    default_suffix: "netCDF1:",
    html_docs: &["NDFileNetCDF.html"],
    family: PluginFamily::File,
    config_attrs: &[],
};

pub static TIFF_PLUGIN: PluginClass = PluginClass {
    name: "TIFFPlugin",
    plugin_type: Some("NDFileTIFF"),
    suffix_pattern: Some(r"TIFF\d:"),
    default_suffix: "TIFF1:",
    html_docs: &["NDFileTIFF.html"],
    family: PluginFamily::File,
    config_attrs: &[],
};

pub static JPEG_PLUGIN: PluginClass = PluginClass {
    name: "JPEGPlugin",
    plugin_type: Some("NDFileJPEG"),
    suffix_pattern: Some(r"JPEG\d:"),
    default_suffix: "JPEG1:",
    html_docs: &["NDFileJPEG.html"],
    family: PluginFamily::File,
    config_attrs: &[ConfigAttr::new("jpeg_quality", "JPEGQuality_RBV")],
};

pub static NEXUS_PLUGIN: PluginClass = PluginClass {
    name: "NexusPlugin",
    plugin_type: Some("NDPluginNexus"),
    suffix_pattern: Some(r"Nexus\d:"),
    default_suffix: "Nexus1:",
    html_docs: &["NDFileNexus.html"],
    family: PluginFamily::File,
    config_attrs: &[
        ConfigAttr::new("template_file_name", "TemplateFileName_RBV"),
        ConfigAttr::new("template_file_path", "TemplateFilePath_RBV"),
    ],
};

pub static HDF5_PLUGIN: PluginClass = PluginClass {
    name: "HDF5Plugin",
    plugin_type: Some("NDFileHDF5"),
    suffix_pattern: Some(r"HDF\d:"),
    default_suffix: "HDF1:",
    html_docs: &["NDFileHDF5.html"],
    family: PluginFamily::File,
    config_attrs: &[
        ConfigAttr::new("boundary_align", "BoundaryAlign_RBV"),
        ConfigAttr::new("compression", "Compression_RBV"),
        ConfigAttr::new("num_extra_dims", "NumExtraDims_RBV"),
        ConfigAttr::new("zlevel", "ZLevel_RBV"),
    ],
};

pub static MAGICK_PLUGIN: PluginClass = PluginClass {
    name: "MagickPlugin",
    plugin_type: Some("NDFileMagick"),
    suffix_pattern: Some(r"Magick\d:"),
    default_suffix: "Magick1:",
    html_docs: &["NDFileMagick.html"],
    family: PluginFamily::File,
    config_attrs: &[
        ConfigAttr::new("bit_depth", "BitDepth_RBV"),
        ConfigAttr::new("compress_type", "CompressType_RBV"),
        ConfigAttr::new("quality", "Quality_RBV"),
    ],
};
