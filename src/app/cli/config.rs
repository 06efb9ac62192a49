//! TOML configuration file loading
//!
//! An explicitly named file must exist. Without one, the default
//! `<config_dir>/adpipeline/adpipeline.toml` is used if present, and
//! built-in defaults otherwise.

use crate::core::error_handling::ContextualError;
use crate::plugin::api::PluginSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "adpipeline";
pub const CONFIG_FILE_NAME: &str = "adpipeline.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { .. } => Some("Configuration file not found"),
            ConfigError::Parse { .. } => Some("Configuration file is not valid TOML"),
            ConfigError::Read { .. } => None,
        }
    }
}

/// `[logging]` table; command-line flags override every field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub timeouts: PluginSettings,
    pub logging: LoggingSettings,
}

/// `<config_dir>/adpipeline/adpipeline.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Which file to load, if any
    pub fn resolve_path(config_file: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        match config_file {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::Missing {
                path: path.to_path_buf(),
            }),
            None => Ok(default_config_path().filter(|path| path.exists())),
        }
    }

    /// Load settings, returning the path they came from
    pub async fn load(config_file: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let Some(path) = Self::resolve_path(config_file)? else {
            log::debug!("No configuration file found; using defaults");
            return Ok((Self::default(), None));
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        let settings = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok((settings, Some(path)))
    }
}
