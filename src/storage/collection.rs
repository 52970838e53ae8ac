//! JSON collection storage
//!
//! Each collection-backed family persists its records in a single JSON
//! document, `{ "<plural>": { "<uuid>": { ... } } }`. Documents are
//! validated on load, written atomically (temp file + rename) under a file
//! lock, and bootstrap themselves on first read.
//!
//! There is no cross-operation lock: a read-modify-write cycle from two
//! concurrent callers on the same collection file is last-writer-wins.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use indexmap::IndexMap;
use serde::de::Deserialize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Family, FieldMap, Resource, ResourceEntry};
use crate::plugin::{HookDispatcher, HookEvent, Registry};

use super::paths::DataPaths;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Resource not found with uuid '{uuid}' and familyPlural '{plural}'")]
    NotFound { uuid: Uuid, plural: &'static str },

    #[error("Collection file {file} failed validation: {reason}")]
    Validation { file: PathBuf, reason: String },

    #[error("Family '{0}' has no backing collection")]
    NoCollection(Family),
}

/// Store for one family's JSON collection
pub struct CollectionStore {
    paths: DataPaths,
    family: Family,
    file: PathBuf,
}

impl CollectionStore {
    /// Creates the store for a collection-backed family
    pub fn new(paths: DataPaths, family: Family) -> Result<Self, CollectionError> {
        let file = paths
            .collection_file(family)
            .ok_or(CollectionError::NoCollection(family))?;

        Ok(Self {
            paths,
            family,
            file,
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Returns the path to the collection file
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Reads the collection, synthesizing an empty document on first run
    ///
    /// A missing file is the bootstrap case: the empty document is persisted
    /// and an empty mapping returned. Every other I/O error propagates, and
    /// a document that fails the shape check is a validation error, never
    /// auto-repaired.
    pub fn load(&self) -> Result<IndexMap<Uuid, Resource>> {
        if !self.file.exists() {
            let entries = IndexMap::new();
            self.persist(&entries)?;
            return Ok(entries);
        }

        let file = File::open(&self.file)
            .with_context(|| format!("Failed to open collection: {}", self.file.display()))?;

        // Shared lock for reading, released on drop
        file.lock_shared()
            .context("Failed to acquire read lock on collection")?;

        let mut content = String::new();
        BufReader::new(&file)
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read collection: {}", self.file.display()))?;

        let value: Value = serde_json::from_str(&content).map_err(|err| {
            self.validation_error(format!("not valid JSON: {err}"))
        })?;

        self.validate(value)
    }

    /// Checks the document shape and produces typed records
    fn validate(&self, value: Value) -> Result<IndexMap<Uuid, Resource>> {
        let plural = self.family.plural();

        let Value::Object(mut document) = value else {
            return Err(self.validation_error("document is not a JSON object").into());
        };
        let Some(entries) = document.remove(plural) else {
            return Err(self.validation_error(format!("missing '{plural}' key")).into());
        };
        let Value::Object(entries) = entries else {
            return Err(self.validation_error(format!("'{plural}' is not an object")).into());
        };

        let mut records = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let uuid = Uuid::parse_str(&key).map_err(|_| {
                self.validation_error(format!("key '{key}' is not a UUID"))
            })?;
            let resource = Resource::deserialize(value).map_err(|err| {
                self.validation_error(format!("record '{key}': {err}"))
            })?;
            records.insert(uuid, resource);
        }

        Ok(records)
    }

    fn validation_error(&self, reason: impl Into<String>) -> CollectionError {
        CollectionError::Validation {
            file: self.file.clone(),
            reason: reason.into(),
        }
    }

    /// Writes the whole document atomically
    fn persist(&self, entries: &IndexMap<Uuid, Resource>) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.file.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on collection")?;

            let mut writer = BufWriter::new(&file);
            let document = CollectionDoc {
                plural: self.family.plural(),
                entries,
            };
            serde_json::to_writer_pretty(&mut writer, &document)
                .context("Failed to serialize collection")?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .context("Failed to flush collection")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.file).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.file.display()
            )
        })?;

        Ok(())
    }

    /// Inserts a record under a fresh UUID and returns it
    ///
    /// The record is persisted and its payload directory created before the
    /// add hook runs; a hook failure is logged and does not roll either
    /// back. Callers must treat add as "record persisted, side effects
    /// best-effort".
    pub fn add(&self, registry: &Registry, input: Resource) -> Result<Uuid> {
        let uuid = Uuid::new_v4();

        let mut entries = self.load()?;
        entries.insert(uuid, input);
        self.persist(&entries)?;

        if let Some(dir) = self.paths.resource_dir(self.family, uuid) {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create resource dir: {}", dir.display()))?;
        }

        let dispatcher = HookDispatcher::new(&self.paths, registry);
        if let Err(err) = dispatcher.run_hook(self.family, HookEvent::Add, uuid) {
            tracing::warn!(
                "Add hook failed for {} '{}': {:#}",
                self.family.singular(),
                uuid,
                err
            );
        }

        Ok(uuid)
    }

    /// Removes a record
    ///
    /// The remove hook runs first, while the record is still present; if
    /// hook resolution fails the remove is abandoned and the record
    /// retained. The payload directory is re-created if absent so plugins
    /// always see it. Deleting an absent key is a silent no-op.
    pub fn remove(&self, registry: &Registry, uuid: Uuid) -> Result<()> {
        let dispatcher = HookDispatcher::new(&self.paths, registry);
        dispatcher.run_hook(self.family, HookEvent::Remove, uuid)?;

        if let Some(dir) = self.paths.resource_dir(self.family, uuid) {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create resource dir: {}", dir.display()))?;
        }

        let mut entries = self.load()?;
        entries.shift_remove(&uuid);
        self.persist(&entries)
    }

    /// Shallow-merges `data` over the record and returns the merged entry
    pub fn modify(&self, uuid: Uuid, data: &FieldMap) -> Result<ResourceEntry> {
        let mut entries = self.load()?;
        let current = entries.get(&uuid).ok_or(CollectionError::NotFound {
            uuid,
            plural: self.family.plural(),
        })?;

        let merged = current
            .merged(data)
            .map_err(|err| self.validation_error(format!("merge for '{uuid}': {err}")))?;

        entries.insert(uuid, merged.clone());
        self.persist(&entries)?;

        Ok(ResourceEntry {
            uuid,
            resource: merged,
        })
    }

    /// Merges `data` into the record's `extra[field]` namespace
    pub fn modify_extra(&self, uuid: Uuid, field: &str, data: &FieldMap) -> Result<ResourceEntry> {
        let mut entries = self.load()?;
        let current = entries.get(&uuid).ok_or(CollectionError::NotFound {
            uuid,
            plural: self.family.plural(),
        })?;

        let merged = current.merged_extra(field, data);

        entries.insert(uuid, merged.clone());
        self.persist(&entries)?;

        Ok(ResourceEntry {
            uuid,
            resource: merged,
        })
    }

    /// Returns every record with its uuid attached, in mapping order
    pub fn list(&self) -> Result<Vec<ResourceEntry>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(uuid, resource)| ResourceEntry { uuid, resource })
            .collect())
    }

    /// Returns a single record, if present
    pub fn get(&self, uuid: Uuid) -> Result<Option<Resource>> {
        let mut entries = self.load()?;
        Ok(entries.shift_remove(&uuid))
    }
}

/// The persisted document: one key, the family plural, mapping UUIDs to
/// records in insertion order
struct CollectionDoc<'a> {
    plural: &'static str,
    entries: &'a IndexMap<Uuid, Resource>,
}

impl Serialize for CollectionDoc<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.plural, self.entries)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir, family: Family) -> CollectionStore {
        CollectionStore::new(DataPaths::new(dir.path()), family).unwrap()
    }

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn view_families_have_no_store() {
        let result = CollectionStore::new(DataPaths::new("/data"), Family::Podview);
        assert!(matches!(
            result,
            Err(CollectionError::NoCollection(Family::Podview))
        ));
    }

    #[test]
    fn first_load_bootstraps_an_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);

        let entries = store.load().unwrap();
        assert!(entries.is_empty());

        let content = fs::read_to_string(store.file()).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, json!({ "pods": {} }));
    }

    #[test]
    fn add_persists_record_and_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);
        let registry = Registry::new();

        let uuid = store
            .add(&registry, Resource::new("text/plain").with_field("name", "a"))
            .unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[&uuid].format, "text/plain");

        let payload_dir = DataPaths::new(dir.path())
            .resource_dir(Family::Pod, uuid)
            .unwrap();
        assert!(payload_dir.is_dir());
    }

    #[test]
    fn add_succeeds_when_no_hook_mapping_exists() {
        // The add path is best-effort: a failing hook dispatch must not
        // roll back the persisted record.
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Orb);
        let registry = Registry::new();

        let uuid = store.add(&registry, Resource::new("image/png")).unwrap();

        assert!(store.get(uuid).unwrap().is_some());
    }

    #[test]
    fn remove_without_resolvable_plugin_keeps_the_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);
        let registry = Registry::new();

        let uuid = store.add(&registry, Resource::new("text/plain")).unwrap();

        let result = store.remove(&registry, uuid);
        assert!(result.is_err());
        assert!(store.get(uuid).unwrap().is_some());
    }

    #[test]
    fn modify_merges_across_calls() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);
        let registry = Registry::new();

        let uuid = store.add(&registry, Resource::new("text/plain")).unwrap();

        store.modify(uuid, &fields(json!({"a": 1}))).unwrap();
        let entry = store.modify(uuid, &fields(json!({"b": 2}))).unwrap();

        assert_eq!(entry.uuid, uuid);
        assert_eq!(entry.resource.fields["a"], json!(1));
        assert_eq!(entry.resource.fields["b"], json!(2));

        // And the merge is durable
        let loaded = store.get(uuid).unwrap().unwrap();
        assert_eq!(loaded.fields["a"], json!(1));
        assert_eq!(loaded.fields["b"], json!(2));
    }

    #[test]
    fn modify_unknown_uuid_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);

        let result = store.modify(Uuid::new_v4(), &FieldMap::new());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectionError>(),
            Some(CollectionError::NotFound { .. })
        ));
    }

    #[test]
    fn modify_extra_isolates_plugin_namespaces() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);
        let registry = Registry::new();

        let uuid = store.add(&registry, Resource::new("text/plain")).unwrap();

        store
            .modify_extra(uuid, "p1", &fields(json!({"x": 1})))
            .unwrap();
        store
            .modify_extra(uuid, "p2", &fields(json!({"y": 2})))
            .unwrap();
        let entry = store
            .modify_extra(uuid, "p1", &fields(json!({"z": 3})))
            .unwrap();

        assert_eq!(entry.resource.extra["p1"], fields(json!({"x": 1, "z": 3})));
        assert_eq!(entry.resource.extra["p2"], fields(json!({"y": 2})));
    }

    #[test]
    fn list_returns_entries_with_uuids() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Link);
        let registry = Registry::new();

        let first = store.add(&registry, Resource::new("a/b")).unwrap();
        let second = store.add(&registry, Resource::new("c/d")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);

        let uuids: Vec<_> = listed.iter().map(|e| e.uuid).collect();
        assert!(uuids.contains(&first));
        assert!(uuids.contains(&second));
    }

    #[test]
    fn malformed_document_fails_validation() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);

        fs::write(store.file(), r#"{ "wrong": {} }"#).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectionError>(),
            Some(CollectionError::Validation { .. })
        ));

        fs::write(store.file(), r#"{ "pods": { "not-a-uuid": { "format": "x" } } }"#).unwrap();
        assert!(store.load().is_err());

        fs::write(
            store.file(),
            r#"{ "pods": { "67e55044-10b1-426f-9247-bb680e5fe0c8": { "name": "no format" } } }"#,
        )
        .unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn persist_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, Family::Pod);
        let registry = Registry::new();

        store.add(&registry, Resource::new("text/plain")).unwrap();

        assert!(!store.file().with_extension("json.tmp").exists());
    }
}
