//! Library entry point
//!
//! A [`Library`] wraps one data directory and hands out the per-family
//! stores and the settings/index sources. Creation is lazy: collections
//! bootstrap on first read and directories appear on first write, so there
//! is no separate init step.

use std::path::Path;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::domain::Family;

use super::collection::CollectionStore;
use super::paths::DataPaths;
use super::settings::{JsonIndexStore, JsonSettingsStore};

/// A lode data directory
pub struct Library {
    paths: DataPaths,
}

impl Library {
    /// Opens the library at the given data directory
    pub fn new(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            paths: DataPaths::new(data_dir),
        }
    }

    /// Opens the library at the platform's per-user data directory
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "lode", "lode")
            .ok_or_else(|| anyhow!("Failed to determine a data directory for this platform"))?;

        Ok(Self::new(dirs.data_dir()))
    }

    /// Returns the data directory root
    pub fn data_dir(&self) -> &Path {
        self.paths.data_dir()
    }

    /// Returns the path deriver for this data directory
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Returns the collection store for a collection-backed family
    pub fn store(&self, family: Family) -> Result<CollectionStore> {
        Ok(CollectionStore::new(self.paths.clone(), family)?)
    }

    /// Returns the file-backed settings source
    pub fn settings_store(&self) -> JsonSettingsStore {
        JsonSettingsStore::new(self.paths.settings_file())
    }

    /// Returns the file-backed format index source
    pub fn index_store(&self) -> JsonIndexStore {
        JsonIndexStore::new(self.paths.index_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stores_are_accessible_per_family() {
        let dir = TempDir::new().unwrap();
        let library = Library::new(dir.path());

        let store = library.store(Family::Pod).unwrap();
        assert!(store.file().ends_with("pods.json"));

        assert!(library.store(Family::Overview).is_err());
    }

    #[test]
    fn nothing_is_created_before_first_use() {
        let dir = TempDir::new().unwrap();
        let library = Library::new(dir.path().join("data"));

        assert!(!library.data_dir().exists());

        library.store(Family::Pod).unwrap().load().unwrap();
        assert!(library.data_dir().join("pods.json").is_file());
    }
}
