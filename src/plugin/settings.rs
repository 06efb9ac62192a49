//! Plugin Timing Settings
//!
//! Deadlines for every bounded wait the plugin layer performs. Loaded from the
//! `[timeouts]` table of the configuration file; all fields are optional and
//! given in seconds (the poll interval in milliseconds).

use crate::core::wait::PollPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadline for discovery-by-query reads of the plugin type point
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginSettings {
    /// Discovery-by-query read deadline
    pub discovery_secs: f64,
    /// How long activation waits for the type report point to connect
    pub connection_secs: f64,
    /// How long a staged write may take to show up on its readback
    pub settle_secs: f64,
    /// Readback polling interval
    pub poll_interval_ms: u64,
    /// Pause for the acquisition triggered by a file plugin warmup
    pub warmup_acquire_secs: f64,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            discovery_secs: DEFAULT_DISCOVERY_TIMEOUT.as_secs_f64(),
            connection_secs: 5.0,
            settle_secs: 2.0,
            poll_interval_ms: 20,
            warmup_acquire_secs: 2.0,
        }
    }
}

impl PluginSettings {
    pub fn discovery_timeout(&self) -> Duration {
        secs(self.discovery_secs)
    }

    pub fn connection_timeout(&self) -> Duration {
        secs(self.connection_secs)
    }

    pub fn warmup_acquire(&self) -> Duration {
        secs(self.warmup_acquire_secs)
    }

    /// Poll policy for readback convergence after a staged write
    pub fn settle_policy(&self) -> PollPolicy {
        PollPolicy {
            deadline: secs(self.settle_secs),
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }
}

// Negative or non-finite values collapse to zero
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PluginSettings::default();
        assert_eq!(settings.discovery_timeout(), Duration::from_secs(2));
        assert_eq!(settings.settle_policy().interval, Duration::from_millis(20));
    }

    #[test]
    fn test_partial_toml_table() {
        let settings: PluginSettings = toml::from_str("settle_secs = 0.5\n").unwrap();
        assert_eq!(settings.settle_policy().deadline, Duration::from_millis(500));
        assert_eq!(settings.connection_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<PluginSettings>("settle = 1\n").is_err());
    }

    #[test]
    fn test_negative_deadline_collapses_to_zero() {
        let settings = PluginSettings {
            discovery_secs: -1.0,
            ..PluginSettings::default()
        };
        assert_eq!(settings.discovery_timeout(), Duration::ZERO);
    }
}
