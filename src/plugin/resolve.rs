//! Format resolution
//!
//! Maps a `(family, desired format)` pair to a concrete registered plugin.
//! Resolution is two-tier: a persisted settings override always wins, then
//! the discovered format index supplies a deterministic, order-stable
//! choice among capable plugins.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::domain::Family;
use crate::storage::{IndexSource, SettingsSource};

use super::descriptor::PluginDescriptor;
use super::registry::Registry;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to find a plugin to use for format '{0}'")]
    NoPluginForFormat(String),
}

/// Resolves a format to the registered plugin that handles it
///
/// A settings/index entry naming a plugin id that was never registered is a
/// configuration-data integrity error and surfaces as the registry's
/// not-found error, distinct from [`ResolveError::NoPluginForFormat`].
pub fn resolve_by_format(
    registry: &Registry,
    settings: &dyn SettingsSource,
    index: &dyn IndexSource,
    family: Family,
    format: &str,
) -> Result<Arc<PluginDescriptor>> {
    let settings = settings.get()?;

    let plugin_id = match settings.format_override(family, format) {
        Some(id) => id.to_string(),
        None => {
            let index = index.get()?;
            index
                .first_candidate(format)
                .ok_or_else(|| ResolveError::NoPluginForFormat(format.to_string()))?
                .to_string()
        }
    };

    Ok(registry.get(family, &plugin_id)?)
}
