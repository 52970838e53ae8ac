//! Hook dispatch
//!
//! On resource add/remove the dispatcher resolves the plugin that owns the
//! resource's declared format and invokes its lifecycle callbacks with
//! freshly materialized plugin state. Resolution on this path consults the
//! settings override map only; the format index is never a fallback here.

use anyhow::{bail, Result};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Family;
use crate::storage::{CollectionError, CollectionStore, DataPaths, JsonSettingsStore, SettingsSource};

use super::descriptor::{HookContext, StateContext};
use super::registry::Registry;

/// Resource lifecycle events that dispatch to plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Add,
    Remove,
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Hooks are not supported for family '{0}'")]
    UnsupportedFamily(Family),

    #[error("No plugin mapping for format '{format}' (uuid '{uuid}')")]
    NoFormatMapping { format: String, uuid: Uuid },

    #[error("Family '{0}' has no resource directory convention")]
    NoResourceDir(Family),
}

/// Resolves and invokes plugin lifecycle hooks for resource events
pub struct HookDispatcher<'a> {
    paths: &'a DataPaths,
    registry: &'a Registry,
}

impl<'a> HookDispatcher<'a> {
    pub fn new(paths: &'a DataPaths, registry: &'a Registry) -> Self {
        Self { paths, registry }
    }

    /// Dispatches one lifecycle event for the resource `uuid`
    ///
    /// Descriptors without hooks capability are silently skipped; every
    /// resolution failure is an error for the caller to interpret.
    pub fn run_hook(&self, family: Family, event: HookEvent, uuid: Uuid) -> Result<()> {
        // Explicit partial rollout, not an oversight
        if matches!(family, Family::Overview | Family::Theme | Family::Pack) {
            bail!(HookError::UnsupportedFamily(family));
        }

        let store = CollectionStore::new(self.paths.clone(), family)?;
        let entries = store.load()?;
        let resource = entries.get(&uuid).ok_or(CollectionError::NotFound {
            uuid,
            plural: family.plural(),
        })?;

        let settings = JsonSettingsStore::new(self.paths.settings_file()).get()?;
        let plugin_id = settings
            .format_override(family, &resource.format)
            .ok_or_else(|| HookError::NoFormatMapping {
                format: resource.format.clone(),
                uuid,
            })?;

        let plugin = self.registry.get(family, plugin_id)?;

        let dir = self
            .paths
            .resource_dir(family, uuid)
            .ok_or(HookError::NoResourceDir(family))?;

        if let Some(hooks) = plugin.capability.hooks() {
            let state = hooks.make_state(&StateContext {
                dir: &dir,
                resource,
            })?;
            let ctx = HookContext {
                dir: &dir,
                state,
                resource,
            };
            match event {
                HookEvent::Add => hooks.on_add(ctx)?,
                HookEvent::Remove => hooks.on_remove(ctx)?,
            }
        }

        Ok(())
    }
}
