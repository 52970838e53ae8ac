//! Plugin registry
//!
//! An append-only, in-memory list of registered descriptors keyed by
//! `(family, id)`. The client and server sides each construct one instance
//! at process start and pass it by reference; nothing is persisted, plugins
//! re-register at every boot.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::domain::Family;

use super::descriptor::PluginDescriptor;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to find plugin with family '{family}' and id '{id}'")]
    NotFound { family: Family, id: String },
}

/// Process-scoped registry of plugin descriptors
#[derive(Default)]
pub struct Registry {
    plugins: Mutex<Vec<Arc<PluginDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor unless its `(family, id)` key is already
    /// present
    ///
    /// Re-registration is a no-op, not an error; the registry never
    /// shrinks.
    pub fn register(&self, descriptor: PluginDescriptor) {
        let mut plugins = self.lock();

        let exists = plugins.iter().any(|item| {
            item.metadata.family == descriptor.metadata.family
                && item.metadata.id == descriptor.metadata.id
        });
        if !exists {
            plugins.push(Arc::new(descriptor));
        }
    }

    /// Returns the descriptor with the given key
    ///
    /// Callers reach for `get` only after deciding a specific plugin must
    /// exist, so an absent key is a hard error.
    pub fn get(&self, family: Family, id: &str) -> Result<Arc<PluginDescriptor>, RegistryError> {
        self.lock()
            .iter()
            .find(|item| item.metadata.family == family && item.metadata.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                family,
                id: id.to_string(),
            })
    }

    /// Returns every descriptor of a family, in registration order
    pub fn list(&self, family: Family) -> Vec<Arc<PluginDescriptor>> {
        self.lock()
            .iter()
            .filter(|item| item.metadata.family == family)
            .cloned()
            .collect()
    }

    /// Returns the static enumeration of known plugin families
    ///
    /// The set is fixed by the system, not derived from what registered.
    pub fn families(&self) -> &'static [Family] {
        &Family::ALL
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<PluginDescriptor>>> {
        // The list is append-only, so a panic mid-register cannot leave it
        // inconsistent; recover the guard instead of propagating poison.
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
