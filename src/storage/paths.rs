//! Path derivation for the data directory
//!
//! Pure functions mapping families and UUIDs to their on-disk locations.
//! Collection metadata lives in `<dataDir>/<plural>.json`; resource
//! payloads live in a sharded directory keyed by the first two hex
//! characters of the UUID.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::domain::Family;

/// Derives file and directory locations inside one data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory root
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the JSON collection file for a family, or `None` for
    /// families without a backing collection
    pub fn collection_file(&self, family: Family) -> Option<PathBuf> {
        family
            .has_collection()
            .then(|| self.data_dir.join(format!("{}.json", family.plural())))
    }

    /// Returns the payload root for a family, or `None` for families
    /// without a directory convention
    pub fn family_root(&self, family: Family) -> Option<PathBuf> {
        family
            .has_collection()
            .then(|| self.data_dir.join(family.plural()))
    }

    /// Returns the sharded payload directory for one resource:
    /// `<dataDir>/<plural>/<uuid[0..2]>/<uuid[2..]>`
    pub fn resource_dir(&self, family: Family, uuid: Uuid) -> Option<PathBuf> {
        let root = self.family_root(family)?;
        let (shard, rest) = shard(uuid);
        Some(root.join(shard).join(rest))
    }

    /// Returns the settings document path
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Returns the format index document path
    pub fn index_file(&self) -> PathBuf {
        self.data_dir.join("index.json")
    }
}

/// Splits a UUID's hyphenated form into its shard prefix and remainder
fn shard(uuid: Uuid) -> (String, String) {
    let text = uuid.to_string();
    (text[..2].to_string(), text[2..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collection_file_per_family() {
        let paths = DataPaths::new("/data");

        assert_eq!(
            paths.collection_file(Family::Pod),
            Some(PathBuf::from("/data/pods.json"))
        );
        assert_eq!(paths.collection_file(Family::Podview), None);
        assert_eq!(paths.collection_file(Family::Theme), None);
    }

    #[test]
    fn resource_dir_is_sharded() {
        let paths = DataPaths::new("/data");
        let uuid: Uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

        assert_eq!(
            paths.resource_dir(Family::Pod, uuid),
            Some(PathBuf::from(
                "/data/pods/67/e55044-10b1-426f-9247-bb680e5fe0c8"
            ))
        );
        assert_eq!(paths.resource_dir(Family::Modelview, uuid), None);
    }

    #[test]
    fn settings_and_index_files() {
        let paths = DataPaths::new("/data");
        assert_eq!(paths.settings_file(), PathBuf::from("/data/settings.json"));
        assert_eq!(paths.index_file(), PathBuf::from("/data/index.json"));
    }

    proptest! {
        #[test]
        fn shard_recombines_to_the_uuid(bytes: u128) {
            let uuid = Uuid::from_u128(bytes);
            let (prefix, rest) = shard(uuid);

            prop_assert_eq!(prefix.len(), 2);
            prop_assert_eq!(format!("{prefix}{rest}"), uuid.to_string());
        }
    }
}
