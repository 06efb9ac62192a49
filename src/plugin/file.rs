//! File-writer plugin operations

use crate::plugin::base::Plugin;
use crate::plugin::chain::PipelineNode;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::staging::set_and_wait;
use crate::plugin::types::{PluginFamily, SignalRef};
use crate::point::api::{PointProvider, PointValue};
use std::time::Duration;

const WARMUP_STEP_PAUSE: Duration = Duration::from_millis(100);

/// How a file writer turns arrays into files
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::FromRepr,
)]
#[repr(i64)]
pub enum FileWriteMode {
    Single = 0,
    Capture = 1,
    Stream = 2,
}

impl From<FileWriteMode> for PointValue {
    fn from(mode: FileWriteMode) -> Self {
        PointValue::Int(mode as i64)
    }
}

impl Plugin {
    fn require_file_family(&self, operation: &str) -> PluginResult<()> {
        if self.class().family == PluginFamily::File {
            Ok(())
        } else {
            Err(PluginError::Unsupported {
                class: self.class().name.to_string(),
                operation: operation.to_string(),
            })
        }
    }

    /// Current write mode from `FileWriteMode_RBV`
    pub async fn file_write_mode(&self) -> PluginResult<FileWriteMode> {
        self.require_file_family("file_write_mode")?;
        let raw = self.read_int("FileWriteMode_RBV").await?;
        FileWriteMode::from_repr(raw).ok_or_else(|| PluginError::Communication {
            point: format!("{}FileWriteMode_RBV", self.prefix()),
            cause: format!("unknown file write mode {raw}"),
        })
    }

    pub async fn set_file_write_mode(&self, mode: FileWriteMode) -> PluginResult<()> {
        self.require_file_family("set_file_write_mode")?;
        set_and_wait(
            self.provider()?,
            &self.signal("FileWriteMode"),
            &mode.into(),
            self.settings().settle_policy(),
        )
        .await
    }

    /// Push one frame through a file writer so it learns the array shape.
    ///
    /// Enables the plugin, switches the camera to a single internally
    /// triggered 1 s acquisition, acquires, then restores the camera
    /// settings in reverse order. The plugin stays enabled.
    pub async fn warmup(&self) -> PluginResult<()> {
        self.require_file_family("warmup")?;
        let camera = self.camera()?;
        let provider = self.provider()?;
        let policy = self.settings().settle_policy();

        set_and_wait(
            provider,
            &self.signal("EnableCallbacks"),
            &PointValue::Int(1),
            policy,
        )
        .await?;

        let sequence: Vec<(SignalRef, PointValue)> = vec![
            (camera.array_callbacks(), 1.into()),
            (camera.signal("ImageMode"), "Single".into()),
            (camera.signal("TriggerMode"), "Internal".into()),
            (camera.signal("AcquireTime"), 1.into()),
            (camera.signal("AcquirePeriod"), 1.into()),
            (SignalRef::plain(format!("{}Acquire", camera.prefix())), 1.into()),
        ];

        let mut originals = Vec::with_capacity(sequence.len());
        for (signal, _) in &sequence {
            let original = provider.point(&signal.readback).get().await?;
            originals.push((signal.clone(), original));
        }

        log::debug!("Warming up {} through {}", self.name(), camera.prefix());
        let applied = self.apply_warmup(provider, &sequence).await;
        if applied.is_ok() {
            tokio::time::sleep(self.settings().warmup_acquire()).await;
        }

        for (signal, original) in originals.iter().rev() {
            if let Err(e) = set_and_wait(provider, signal, original, policy).await {
                log::warn!(
                    "Failed to restore {} after warming up {}: {}",
                    signal.setpoint,
                    self.name(),
                    e
                );
            }
        }
        applied
    }

    async fn apply_warmup(
        &self,
        provider: &dyn PointProvider,
        sequence: &[(SignalRef, PointValue)],
    ) -> PluginResult<()> {
        let policy = self.settings().settle_policy();
        for (signal, value) in sequence {
            set_and_wait(provider, signal, value, policy).await?;
            tokio::time::sleep(WARMUP_STEP_PAUSE).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_repr() {
        assert_eq!(FileWriteMode::from_repr(2), Some(FileWriteMode::Stream));
        assert_eq!(FileWriteMode::from_repr(3), None);
        assert_eq!(PointValue::from(FileWriteMode::Capture), PointValue::Int(1));
        assert_eq!(FileWriteMode::Single.to_string(), "Single");
    }
}
