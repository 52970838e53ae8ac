//! Plugin inspection commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::Family;
use crate::plugin::{resolve_by_format, PluginMetadata, Registry};
use crate::storage::Library;

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List registered plugins
    List {
        /// Restrict to one family
        family: Option<Family>,
    },

    /// Resolve which plugin handles a format
    Resolve {
        family: Family,

        /// Content format (e.g. application/x-tex)
        format: String,
    },
}

pub fn run(
    cmd: PluginCommands,
    library: &Library,
    registry: &Registry,
    output: &Output,
) -> Result<()> {
    match cmd {
        PluginCommands::List { family } => list_plugins(registry, output, family),
        PluginCommands::Resolve { family, format } => {
            resolve(library, registry, output, family, &format)
        }
    }
}

fn list_plugins(registry: &Registry, output: &Output, family: Option<Family>) -> Result<()> {
    let families: Vec<Family> = match family {
        Some(family) => vec![family],
        None => registry.families().to_vec(),
    };

    let mut plugins: Vec<PluginMetadata> = Vec::new();
    for family in families {
        for plugin in registry.list(family) {
            plugins.push(plugin.metadata.clone());
        }
    }

    if output.is_json() {
        output.data(&plugins);
    } else {
        for metadata in &plugins {
            output.row(&[metadata.family.singular(), &metadata.id, &metadata.format]);
        }
    }
    Ok(())
}

fn resolve(
    library: &Library,
    registry: &Registry,
    output: &Output,
    family: Family,
    format: &str,
) -> Result<()> {
    let plugin = resolve_by_format(
        registry,
        &library.settings_store(),
        &library.index_store(),
        family,
        format,
    )?;

    if output.is_json() {
        output.data(&plugin.metadata);
    } else {
        output.success(&plugin.metadata.id);
    }
    Ok(())
}

pub fn families(registry: &Registry, output: &Output) -> Result<()> {
    if output.is_json() {
        output.data(&registry.families());
    } else {
        for family in registry.families() {
            output.row(&[family.singular()]);
        }
    }
    Ok(())
}
