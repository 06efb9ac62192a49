//! Public API exports for the CLI module

pub use crate::app::cli::args::{parse_axis_span, Args, Command};
pub use crate::app::cli::config::{
    default_config_path, ConfigError, LoggingSettings, Settings, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use crate::app::cli::display::ChainRow;
