//! Command-line arguments
//!
//! Global flags come first; each subcommand names the plugin or prefix it
//! operates on within the simulated detector.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "adpipeline")]
#[command(about = "Inspect and stage areaDetector plugin pipelines")]
#[command(version)]
pub struct Args {
    /// Simulated detector description (TOML)
    #[arg(short = 's', long = "sim", value_name = "FILE")]
    pub sim: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the pipeline from the camera down to a plugin
    Chain {
        /// Plugin attribute or device name
        plugin: String,
    },
    /// Show a plugin's configuration merged with its upstream pipeline
    Config {
        plugin: String,
        /// Show field descriptions instead of values
        #[arg(long)]
        describe: bool,
    },
    /// Identify the plugin class serving a prefix
    Discover {
        prefix: String,
        /// Live query deadline in seconds
        #[arg(short = 't', long = "timeout", value_name = "SECONDS")]
        timeout: Option<f64>,
    },
    /// Stage a plugin, show what changed, then unstage it
    Stage { plugin: String },
    /// Set a region of interest (AXIS=MIN:SIZE, e.g. x=10:100)
    Roi {
        plugin: String,
        #[arg(required = true, value_name = "AXIS=MIN:SIZE", value_parser = parse_axis_span)]
        spans: Vec<(String, (i64, i64))>,
    },
    /// List the registered plugin classes
    Classes,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Chain { .. } => "chain",
            Command::Config { .. } => "config",
            Command::Discover { .. } => "discover",
            Command::Stage { .. } => "stage",
            Command::Roi { .. } => "roi",
            Command::Classes => "classes",
        }
    }

    /// Whether the command runs against a simulated detector
    pub fn needs_simulation(&self) -> bool {
        !matches!(self, Command::Classes)
    }
}

impl Args {
    /// Log file to use: the command line wins over `configured`, and
    /// `--log-file none` disables file output entirely
    pub fn resolve_log_file(&self, configured: Option<PathBuf>) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) if path.as_os_str() == "none" => None,
            Some(path) => Some(path.clone()),
            None => configured,
        }
    }
}

/// Parse `x=10:100` into `("x", (10, 100))`
pub fn parse_axis_span(raw: &str) -> Result<(String, (i64, i64)), String> {
    let (axis, span) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected AXIS=MIN:SIZE, got {raw:?}"))?;
    let (min, size) = span
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:SIZE after {axis}=, got {span:?}"))?;
    let min = min
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid minimum {min:?}: {e}"))?;
    let size = size
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid size {size:?}: {e}"))?;
    Ok((axis.trim().to_lowercase(), (min, size)))
}
