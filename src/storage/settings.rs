//! Settings and format index documents
//!
//! Both documents are read-only from the store's perspective: settings hold
//! the user's explicit format-to-plugin overrides, the index holds the
//! discovered candidates per format. They are consumed through the
//! [`SettingsSource`]/[`IndexSource`] traits so format resolution binds to
//! the interface rather than to the file store behind it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Family;

/// Provider of the persisted settings document
pub trait SettingsSource {
    fn get(&self) -> Result<Settings>;
}

/// Provider of the format index document
pub trait IndexSource {
    fn get(&self) -> Result<FormatIndex>;
}

/// Persisted per-format plugin overrides
///
/// Absence of an entry falls through to the format index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Pod-family override: format to plugin id
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pod_mimes: BTreeMap<String, String>,

    /// General override: format to plugin id
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mimes_to_plugin: BTreeMap<String, String>,
}

impl Settings {
    /// Returns the overriding plugin id for a format, if any
    ///
    /// The family-specific map wins over the general one.
    pub fn format_override(&self, family: Family, format: &str) -> Option<&str> {
        let specific = match family {
            Family::Pod => self.pod_mimes.get(format),
            _ => None,
        };

        specific
            .or_else(|| self.mimes_to_plugin.get(format))
            .map(String::as_str)
    }
}

/// Discovered plugin candidates per format, in stable preference order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatIndex {
    pub formats: BTreeMap<String, Vec<String>>,
}

impl FormatIndex {
    /// Returns the first candidate plugin id for a format, if any
    pub fn first_candidate(&self, format: &str) -> Option<&str> {
        self.formats
            .get(format)
            .and_then(|candidates| candidates.first())
            .map(String::as_str)
    }
}

/// File-backed settings store (`settings.json`)
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for JsonSettingsStore {
    fn get(&self) -> Result<Settings> {
        let content = read_or_init(&self.path, "{}")?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", self.path.display()))
    }
}

/// File-backed format index store (`index.json`)
#[derive(Debug, Clone)]
pub struct JsonIndexStore {
    path: PathBuf,
}

impl JsonIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IndexSource for JsonIndexStore {
    fn get(&self) -> Result<FormatIndex> {
        let content = read_or_init(&self.path, "{ \"formats\": {} }")?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse format index: {}", self.path.display()))
    }
}

/// Reads a document, synthesizing and persisting the default when the file
/// does not exist yet
///
/// Every other I/O error propagates.
fn read_or_init(path: &Path, default: &str) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(path, default)
                .with_context(|| format!("Failed to write default document: {}", path.display()))?;
            Ok(default.to_string())
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read document: {}", path.display()))
        }
    }
}
