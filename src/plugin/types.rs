//! Type definitions for the plugin system
//!
//! Class descriptors, type-validation state, remote signal references and
//! the configuration map shared by every pipeline node.

use crate::plugin::builtin::{BASE_CONFIG_ATTRS, FILE_CONFIG_ATTRS};

/// Ordered mapping of configuration field name to reading.
///
/// Each value is an object with `value` and `timestamp` keys (or `source`,
/// `dtype` and `shape` for descriptions). Insertion order is preserved.
pub type Configuration = serde_json::Map<String, serde_json::Value>;

/// Result of checking a plugin class's declared type against the server
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum TypeState {
    /// The class declares no type; nothing to check
    #[strum(serialize = "no-expectation")]
    NoExpectation,
    /// A type is declared but the server has not been consulted yet
    #[strum(serialize = "unknown")]
    Unknown,
    #[strum(serialize = "confirmed-ok")]
    ConfirmedOk { reported: String },
    #[strum(serialize = "confirmed-bad")]
    ConfirmedBad { reported: String },
}

impl TypeState {
    /// Initial state for a class
    pub fn initial(class: &PluginClass) -> Self {
        if class.plugin_type.is_some() {
            TypeState::Unknown
        } else {
            TypeState::NoExpectation
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeState::Unknown)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_unknown()
    }

    /// `Some(true)` when confirmed bad, `None` while unknown
    pub fn is_misconfigured(&self) -> Option<bool> {
        match self {
            TypeState::Unknown => None,
            TypeState::ConfirmedBad { .. } => Some(true),
            TypeState::NoExpectation | TypeState::ConfirmedOk { .. } => Some(false),
        }
    }
}

/// Functional grouping of plugin classes; gates family-specific operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PluginFamily {
    Processing,
    RegionOfInterest,
    File,
}

/// One configuration attribute: field suffix and the point it is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigAttr {
    pub attr: &'static str,
    pub suffix: &'static str,
}

impl ConfigAttr {
    pub const fn new(attr: &'static str, suffix: &'static str) -> Self {
        Self { attr, suffix }
    }
}

/// Static description of a plugin class
#[derive(Debug, PartialEq, Eq)]
pub struct PluginClass {
    /// Class name as reported in mismatch errors
    pub name: &'static str,
    /// Type identifier the server reports in `PluginType_RBV`
    pub plugin_type: Option<&'static str>,
    /// Recognition pattern searched for anywhere in a prefix
    pub suffix_pattern: Option<&'static str>,
    pub default_suffix: &'static str,
    pub html_docs: &'static [&'static str],
    pub family: PluginFamily,
    /// Class-specific configuration on top of the shared attributes
    pub config_attrs: &'static [ConfigAttr],
}

impl PluginClass {
    /// Every configuration attribute of the class, shared ones first
    pub fn configuration_attrs(&self) -> Vec<ConfigAttr> {
        let mut attrs: Vec<ConfigAttr> = BASE_CONFIG_ATTRS.to_vec();
        if self.family == PluginFamily::File {
            attrs.extend_from_slice(FILE_CONFIG_ATTRS);
        }
        attrs.extend_from_slice(self.config_attrs);
        attrs
    }
}

/// A setpoint and the readback it settles on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalRef {
    pub setpoint: String,
    pub readback: String,
}

impl SignalRef {
    /// `NAME` written, `NAME_RBV` read back
    pub fn with_readback(name: impl Into<String>) -> Self {
        let setpoint = name.into();
        let readback = format!("{setpoint}_RBV");
        Self { setpoint, readback }
    }

    /// Written and read back through the same point
    pub fn plain(name: impl Into<String>) -> Self {
        let setpoint = name.into();
        Self {
            readback: setpoint.clone(),
            setpoint,
        }
    }
}

/// Construction arguments for a plugin instance
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Device name; derived from the prefix when absent
    pub name: Option<String>,
    pub settings: crate::plugin::settings::PluginSettings,
}

impl PluginOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::builtin::{FILE_PLUGIN, HDF5_PLUGIN, STATS_PLUGIN};

    #[test]
    fn test_initial_state_follows_declared_type() {
        assert_eq!(TypeState::initial(&STATS_PLUGIN), TypeState::Unknown);

        static UNTYPED: PluginClass = PluginClass {
            name: "Untyped",
            plugin_type: None,
            suffix_pattern: None,
            default_suffix: "",
            html_docs: &[],
            family: PluginFamily::Processing,
            config_attrs: &[],
        };
        assert_eq!(TypeState::initial(&UNTYPED), TypeState::NoExpectation);
        assert_eq!(TypeState::NoExpectation.is_misconfigured(), Some(false));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(TypeState::Unknown.to_string(), "unknown");
        assert_eq!(
            TypeState::ConfirmedBad {
                reported: "NDPluginROI".into()
            }
            .to_string(),
            "confirmed-bad"
        );
    }

    #[test]
    fn test_file_classes_inherit_file_attrs() {
        let hdf = HDF5_PLUGIN.configuration_attrs();
        let file = FILE_PLUGIN.configuration_attrs();
        assert!(hdf.iter().any(|a| a.attr == "file_path"));
        assert!(hdf.iter().any(|a| a.attr == "zlevel"));
        assert!(!file.iter().any(|a| a.attr == "zlevel"));
        assert_eq!(hdf[0].attr, "port_name");
    }

    #[test]
    fn test_signal_ref_readback_naming() {
        let signal = SignalRef::with_readback("XF:DET:Stats1:EnableCallbacks");
        assert_eq!(signal.readback, "XF:DET:Stats1:EnableCallbacks_RBV");
        let plain = SignalRef::plain("XF:DET:cam1:Acquire");
        assert_eq!(plain.setpoint, plain.readback);
    }
}
