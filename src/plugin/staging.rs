//! Staging (activation) protocol
//!
//! Activation validates the plugin type, snapshots every directive's current
//! readback, writes the directive values in order and waits for each
//! readback to settle. Deactivation restores the snapshot in reverse order.

use crate::core::wait::{poll_until, PollPolicy};
use crate::plugin::base::Plugin;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::SignalRef;
use crate::point::api::{PointProvider, PointValue};
use std::sync::Arc;

/// Ordered (signal, value) pairs written on activation, keyed by setpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageDirectives {
    entries: Vec<(SignalRef, PointValue)>,
}

impl StageDirectives {
    /// Replace the value for an existing setpoint in place, or append
    pub fn set(&mut self, signal: SignalRef, value: impl Into<PointValue>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.setpoint == signal.setpoint)
        {
            Some(entry) => *entry = (signal, value),
            None => self.entries.push((signal, value)),
        }
    }

    pub fn get(&self, setpoint: &str) -> Option<&PointValue> {
        self.entries
            .iter()
            .find(|(signal, _)| signal.setpoint == setpoint)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, setpoint: &str) -> Option<PointValue> {
        let index = self
            .entries
            .iter()
            .position(|(signal, _)| signal.setpoint == setpoint)?;
        Some(self.entries.remove(index).1)
    }

    pub fn move_to_front(&mut self, setpoint: &str) {
        if let Some(index) = self
            .entries
            .iter()
            .position(|(signal, _)| signal.setpoint == setpoint)
        {
            let entry = self.entries.remove(index);
            self.entries.insert(0, entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SignalRef, PointValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Original readback values captured during activation, in write order
#[derive(Debug, Clone, Default)]
pub struct StageSnapshot {
    entries: Vec<(SignalRef, PointValue)>,
    complete: bool,
}

impl StageSnapshot {
    pub fn entries(&self) -> &[(SignalRef, PointValue)] {
        &self.entries
    }

    /// Whether every directive was applied
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Outcome of a best-effort deactivation
#[derive(Debug, Default)]
pub struct DeactivationReport {
    /// Setpoints restored, in restore order
    pub restored: Vec<String>,
    pub failures: Vec<(String, PluginError)>,
}

impl DeactivationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write `value` and wait for the readback to match it
pub(crate) async fn set_and_wait(
    provider: &dyn PointProvider,
    signal: &SignalRef,
    value: &PointValue,
    policy: PollPolicy,
) -> PluginResult<()> {
    provider.point(&signal.setpoint).put(value.clone(), true).await?;

    let readback = provider.point(&signal.readback);
    let settled = poll_until(&signal.readback, policy, || {
        let readback = Arc::clone(&readback);
        async move {
            let current = readback.get().await?;
            Ok::<_, PluginError>(current.matches(value).then_some(()))
        }
    })
    .await?;

    settled.ok_or_else(|| PluginError::Timeout {
        operation: format!("waiting for {} to reach {}", signal.readback, value),
        deadline: policy.deadline,
    })
}

impl Plugin {
    /// Stage the plugin.
    ///
    /// Fails with a configuration mismatch before anything is written if the
    /// server reports a different plugin type. A failure part-way leaves the
    /// earlier writes in place; `deactivate` restores them.
    pub async fn activate(&self) -> PluginResult<()> {
        let mut staged = self.staged.lock().await;
        match staged.as_ref() {
            Some(snapshot) if snapshot.is_complete() => {
                log::debug!("{} is already staged", self.name());
                return Ok(());
            }
            Some(_) => {
                return Err(PluginError::PartialActivation {
                    prefix: self.prefix().to_string(),
                })
            }
            None => {}
        }

        self.ensure_type_confirmed().await?;

        let policy = self.settings().settle_policy();
        let mut snapshot = StageSnapshot::default();
        let outcome = self
            .apply_directives(&self.stage_directives(), policy, &mut snapshot)
            .await;
        snapshot.complete = outcome.is_ok();
        if !snapshot.entries.is_empty() || snapshot.complete {
            *staged = Some(snapshot);
        }
        outcome
    }

    async fn apply_directives(
        &self,
        directives: &StageDirectives,
        policy: PollPolicy,
        snapshot: &mut StageSnapshot,
    ) -> PluginResult<()> {
        for (signal, value) in directives.iter() {
            let provider = self.provider()?;
            let original = provider.point(&signal.readback).get().await?;
            snapshot.entries.push((signal.clone(), original));
            log::debug!("Staging {}: {} -> {}", self.name(), signal.setpoint, value);
            set_and_wait(provider, signal, value, policy).await?;
        }
        Ok(())
    }

    /// Restore every value changed by the last activation, newest first.
    ///
    /// Restore failures are logged and collected; the remaining values are
    /// still restored. Deactivating an unstaged plugin does nothing.
    pub async fn deactivate(&self) -> DeactivationReport {
        let snapshot = self.staged.lock().await.take();
        let mut report = DeactivationReport::default();
        let Some(snapshot) = snapshot else {
            return report;
        };

        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                log::warn!("Cannot restore {}: {}", self.name(), e);
                for (signal, _) in snapshot.entries.iter().rev() {
                    report.failures.push((signal.setpoint.clone(), e.clone()));
                }
                return report;
            }
        };

        let policy = self.settings().settle_policy();
        for (signal, original) in snapshot.entries.iter().rev() {
            match set_and_wait(provider, signal, original, policy).await {
                Ok(()) => report.restored.push(signal.setpoint.clone()),
                Err(e) => {
                    log::warn!(
                        "Failed to restore {} to {} while unstaging {}: {}",
                        signal.setpoint,
                        original,
                        self.name(),
                        e
                    );
                    report.failures.push((signal.setpoint.clone(), e));
                }
            }
        }
        report
    }

    pub async fn is_staged(&self) -> bool {
        self.staged
            .lock()
            .await
            .as_ref()
            .is_some_and(StageSnapshot::is_complete)
    }
}

/// Stage plugins in order. If one fails, the plugins staged before it are
/// deactivated in reverse order and the error is returned; the failing
/// plugin keeps its partial snapshot.
pub async fn stage_all(plugins: &[Arc<Plugin>]) -> PluginResult<()> {
    for (index, plugin) in plugins.iter().enumerate() {
        if let Err(e) = plugin.activate().await {
            log::warn!("Staging {} failed: {}", plugin.name(), e);
            unstage_all(&plugins[..index]).await;
            return Err(e);
        }
    }
    Ok(())
}

/// Deactivate plugins in reverse order
pub async fn unstage_all(plugins: &[Arc<Plugin>]) -> Vec<DeactivationReport> {
    let mut reports = Vec::with_capacity(plugins.len());
    for plugin in plugins.iter().rev() {
        reports.push(plugin.deactivate().await);
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(name: &str) -> SignalRef {
        SignalRef::with_readback(name)
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut directives = StageDirectives::default();
        directives.set(signal("A"), 1);
        directives.set(signal("B"), 2);
        directives.set(signal("A"), 3);

        let order: Vec<_> = directives.iter().map(|(s, _)| s.setpoint.clone()).collect();
        assert_eq!(order, vec!["A", "B"]);
        assert_eq!(directives.get("A"), Some(&PointValue::Int(3)));
    }

    #[test]
    fn test_move_to_front_and_remove() {
        let mut directives = StageDirectives::default();
        directives.set(signal("A"), 1);
        directives.set(signal("B"), 2);
        directives.move_to_front("B");
        assert_eq!(directives.iter().next().unwrap().0.setpoint, "B");

        assert_eq!(directives.remove("B"), Some(PointValue::Int(2)));
        assert_eq!(directives.remove("B"), None);
        assert_eq!(directives.len(), 1);
        directives.move_to_front("missing");
        assert_eq!(directives.len(), 1);
    }
}
