//! Plugin Registry
//!
//! Thread-safe registry mapping server-reported plugin type identifiers to
//! plugin classes, with compiled recognition patterns kept in registration
//! order for prefix matching.

use crate::core::sync::handle_rwlock_write;
use crate::plugin::builtin::builtin_classes;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::PluginClass;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

static GLOBAL_REGISTRY: Lazy<SharedPluginRegistry> =
    Lazy::new(|| SharedPluginRegistry::from_registry(PluginRegistry::with_builtin_classes()));

struct RegistryEntry {
    class: &'static PluginClass,
    pattern: Option<Regex>,
}

/// Plugin class registry
pub struct PluginRegistry {
    /// Registered classes in registration order
    entries: Vec<RegistryEntry>,

    /// Map of plugin type identifier to index in `entries`
    by_type: HashMap<&'static str, usize>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugin_types", &self.plugin_types())
            .finish()
    }
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_type: HashMap::new(),
        }
    }

    /// Registry holding every built-in class.
    ///
    /// A built-in class that fails to register is logged and skipped.
    pub fn with_builtin_classes() -> Self {
        let mut registry = Self::new();
        for class in builtin_classes() {
            if let Err(e) = registry.register(class) {
                log::error!("Failed to register built-in class {}: {}", class.name, e);
            }
        }
        registry
    }

    /// Register a class under its plugin type.
    ///
    /// Registering a type that already exists replaces the earlier class but
    /// keeps its position in the pattern-matching order.
    pub fn register(&mut self, class: &'static PluginClass) -> PluginResult<()> {
        let Some(plugin_type) = class.plugin_type else {
            return Err(PluginError::Unsupported {
                class: class.name.to_string(),
                operation: "registration without a plugin type".to_string(),
            });
        };

        let pattern = class
            .suffix_pattern
            .map(|p| {
                Regex::new(p).map_err(|e| PluginError::InvalidPattern {
                    class: class.name.to_string(),
                    pattern: p.to_string(),
                    cause: e.to_string(),
                })
            })
            .transpose()?;

        let entry = RegistryEntry { class, pattern };
        match self.by_type.get(plugin_type) {
            Some(&index) => {
                log::debug!(
                    "Replacing {} with {} for plugin type {}",
                    self.entries[index].class.name,
                    class.name,
                    plugin_type
                );
                self.entries[index] = entry;
            }
            None => {
                self.by_type.insert(plugin_type, self.entries.len());
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Class registered for a plugin type identifier
    pub fn get(&self, plugin_type: &str) -> Option<&'static PluginClass> {
        self.by_type
            .get(plugin_type)
            .map(|&index| self.entries[index].class)
    }

    /// First class, in registration order, whose pattern occurs in `prefix`
    pub fn match_prefix(&self, prefix: &str) -> Option<&'static PluginClass> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .pattern
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(prefix))
            })
            .map(|entry| entry.class)
    }

    pub fn has_type(&self, plugin_type: &str) -> bool {
        self.by_type.contains_key(plugin_type)
    }

    /// Registered plugin types in registration order
    pub fn plugin_types(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.class.plugin_type)
            .collect()
    }

    /// Registered classes in registration order
    pub fn classes(&self) -> Vec<&'static PluginClass> {
        self.entries.iter().map(|entry| entry.class).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe shared plugin registry
#[derive(Debug, Clone)]
pub struct SharedPluginRegistry {
    inner: Arc<RwLock<PluginRegistry>>,
}

impl SharedPluginRegistry {
    /// Create a new, empty shared registry
    pub fn new() -> Self {
        Self::from_registry(PluginRegistry::new())
    }

    pub fn from_registry(registry: PluginRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// The process-wide registry, seeded with the built-in classes
    pub fn global() -> Self {
        GLOBAL_REGISTRY.clone()
    }

    pub fn register(&self, class: &'static PluginClass) -> PluginResult<()> {
        let mut registry = handle_rwlock_write(self.inner.write(), |reason| {
            PluginError::Communication {
                point: "plugin registry".to_string(),
                cause: reason,
            }
        })?;
        registry.register(class)
    }

    /// Pattern-only lookup; never touches the network
    pub fn plugin_class_for(&self, prefix: &str) -> Option<&'static PluginClass> {
        self.read(|registry| registry.match_prefix(prefix))
    }

    pub fn class_for_type(&self, plugin_type: &str) -> Option<&'static PluginClass> {
        self.read(|registry| registry.get(plugin_type))
    }

    pub fn plugin_types(&self) -> Vec<&'static str> {
        self.read(PluginRegistry::plugin_types)
    }

    pub fn classes(&self) -> Vec<&'static PluginClass> {
        self.read(PluginRegistry::classes)
    }

    // A poisoned lock still holds a consistent registry: entries are only
    // ever replaced whole.
    fn read<T>(&self, f: impl FnOnce(&PluginRegistry) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| {
            log::warn!("Plugin registry lock poisoned; reading anyway");
            poisoned.into_inner()
        });
        f(&guard)
    }
}

impl Default for SharedPluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
