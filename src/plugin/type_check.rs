//! Plugin type validation
//!
//! Compares the class's declared plugin type with what the server reports in
//! `PluginType_RBV`. The first successful comparison is final.

use crate::core::sync::recover_lock;
use crate::plugin::base::{Plugin, PLUGIN_TYPE_SUFFIX};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::TypeState;
use crate::point::api::PointError;
use std::sync::Arc;

impl Plugin {
    pub fn type_state(&self) -> TypeState {
        recover_lock(self.type_state.lock()).clone()
    }

    /// `None` until the type has been checked
    pub fn is_misconfigured(&self) -> Option<bool> {
        self.type_state().is_misconfigured()
    }

    /// Read the reported type and settle the state if it is still unknown.
    ///
    /// A destroyed or disconnected type point leaves the state unknown
    /// without error. Fails with `Destroyed` once the owning detector is gone.
    pub async fn check_type(&self) -> PluginResult<TypeState> {
        self.ensure_live()?;
        let Some(expected) = self.class().plugin_type else {
            return Ok(TypeState::NoExpectation);
        };
        let current = self.type_state();
        if current.is_terminal() {
            return Ok(current);
        }

        let reported = match self.point(PLUGIN_TYPE_SUFFIX)?.get().await {
            Ok(value) => value.to_string(),
            Err(e @ (PointError::Destroyed { .. } | PointError::Disconnected { .. })) => {
                log::debug!("Type check for {} skipped: {}", self.prefix(), e);
                return Ok(self.type_state());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.record_type_report(expected, reported))
    }

    fn record_type_report(&self, expected: &str, reported: String) -> TypeState {
        let mut state = recover_lock(self.type_state.lock());
        if state.is_terminal() {
            return state.clone();
        }

        if reported.starts_with(expected) {
            log::debug!(
                "Plugin prefix {:?} type confirmed: {:?} class (plugin type={:?}); \
                 plugin reports it is of type {:?}",
                self.prefix(),
                self.class().name,
                expected,
                reported
            );
            *state = TypeState::ConfirmedOk { reported };
        } else {
            log::warn!(
                "Plugin prefix {:?}: trying to use {:?} class (plugin type={:?}) \
                 but the plugin reports it is of type {:?}",
                self.prefix(),
                self.class().name,
                expected,
                reported
            );
            *state = TypeState::ConfirmedBad { reported };
        }
        state.clone()
    }

    /// Resolve an unknown type state and fail if it is confirmed bad
    pub(crate) async fn ensure_type_confirmed(&self) -> PluginResult<()> {
        if self.type_state().is_unknown() {
            self.point(PLUGIN_TYPE_SUFFIX)?
                .wait_for_connection(self.settings().connection_timeout())
                .await?;
            self.check_type().await?;
        }

        match self.type_state() {
            TypeState::ConfirmedBad { reported } => Err(PluginError::ConfigurationMismatch {
                prefix: self.prefix().to_string(),
                class: self.class().name.to_string(),
                expected: self.class().plugin_type.unwrap_or_default().to_string(),
                reported,
            }),
            TypeState::Unknown => {
                log::debug!(
                    "Type of {} still unknown after forced check; continuing",
                    self.prefix()
                );
                Ok(())
            }
            TypeState::NoExpectation | TypeState::ConfirmedOk { .. } => Ok(()),
        }
    }

    /// Check the type whenever the type point (re)connects.
    ///
    /// The check runs on the runtime that was current when the plugin was
    /// built; without one, the check is left to activation. The subscription
    /// lives as long as the plugin.
    pub(crate) fn watch_type_report(&self) {
        if self.class().plugin_type.is_none() {
            return;
        }
        let runtime = tokio::runtime::Handle::try_current().ok();
        let weak = self.downgrade();
        let prefix = self.prefix().to_string();
        let callback = Arc::new(move |connected: bool| {
            if !connected {
                return;
            }
            let Some(plugin) = weak.upgrade() else {
                return;
            };
            if plugin.type_state().is_terminal() {
                return;
            }
            match &runtime {
                Some(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = plugin.check_type().await {
                            log::debug!("Type check for {} failed: {}", plugin.prefix(), e);
                        }
                    });
                }
                None => log::debug!(
                    "No async runtime; type check for {} deferred to activation",
                    prefix
                ),
            }
        });
        let subscription = self
            .unchecked_point(PLUGIN_TYPE_SUFFIX)
            .subscribe_connection(callback);
        *recover_lock(self.type_watch.lock()) = Some(subscription);
    }
}
