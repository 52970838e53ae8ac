//! End-to-end resource lifecycle tests
//!
//! These tests exercise the full pipeline: collection store, payload
//! directory sharding, hook dispatch, and plugin resolution, against a real
//! temporary data directory.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

use lode_cli::domain::{Family, FieldMap, Resource};
use lode_cli::plugin::{
    resolve_by_format, Component, HookContext, LifecycleHooks, PluginDescriptor, PluginMetadata,
    PluginState, Registry, StateContext,
};
use lode_cli::storage::Library;

/// A plugin that records every hook invocation
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(&'static str, PathBuf, String)>>,
}

struct RecordingHooks {
    recorder: Arc<Recorder>,
}

impl LifecycleHooks for RecordingHooks {
    fn make_state(&self, ctx: &StateContext<'_>) -> anyhow::Result<PluginState> {
        Ok(Box::new(ctx.dir.to_path_buf()))
    }

    fn on_add(&self, ctx: HookContext<'_>) -> anyhow::Result<()> {
        self.record("add", ctx);
        Ok(())
    }

    fn on_remove(&self, ctx: HookContext<'_>) -> anyhow::Result<()> {
        self.record("remove", ctx);
        Ok(())
    }
}

impl RecordingHooks {
    fn record(&self, event: &'static str, ctx: HookContext<'_>) {
        self.recorder.calls.lock().unwrap().push((
            event,
            ctx.dir.to_path_buf(),
            ctx.resource.format.clone(),
        ));
    }
}

fn fields(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Library plus a registry holding one recording latex plugin
fn setup() -> (TempDir, Library, Registry, Arc<Recorder>) {
    let dir = TempDir::new().unwrap();
    let library = Library::new(dir.path());
    let recorder = Arc::new(Recorder::default());

    let registry = Registry::new();
    registry.register(PluginDescriptor::server(
        PluginMetadata::new(Family::Pod, "latex", "application/x-tex"),
        Arc::new(RecordingHooks {
            recorder: recorder.clone(),
        }),
    ));

    fs::write(
        library.paths().settings_file(),
        r#"{ "podMimes": { "application/x-tex": "latex" } }"#,
    )
    .unwrap();

    (dir, library, registry, recorder)
}

#[test]
fn add_invokes_plugin_with_directory_and_record() {
    let (_dir, library, registry, recorder) = setup();
    let store = library.store(Family::Pod).unwrap();

    let uuid = store
        .add(&registry, Resource::new("application/x-tex"))
        .unwrap();

    // Record persisted under the new uuid
    let content = fs::read_to_string(store.file()).unwrap();
    let document: Value = serde_json::from_str(&content).unwrap();
    assert!(document["pods"][uuid.to_string()].is_object());

    // Sharded payload directory exists
    let expected_dir = library
        .paths()
        .resource_dir(Family::Pod, uuid)
        .unwrap();
    assert!(expected_dir.is_dir());
    let text = uuid.to_string();
    assert!(expected_dir.ends_with(PathBuf::from(&text[..2]).join(&text[2..])));

    // Plugin saw the event with the directory and the record
    let calls = recorder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        ("add", expected_dir, "application/x-tex".to_string())
    );
}

#[test]
fn remove_invokes_hook_then_deletes_the_record() {
    let (_dir, library, registry, recorder) = setup();
    let store = library.store(Family::Pod).unwrap();

    let uuid = store
        .add(&registry, Resource::new("application/x-tex"))
        .unwrap();
    store.remove(&registry, uuid).unwrap();

    assert!(store.get(uuid).unwrap().is_none());

    let calls = recorder.calls.lock().unwrap();
    let events: Vec<_> = calls.iter().map(|(event, _, _)| *event).collect();
    assert_eq!(events, vec!["add", "remove"]);
}

#[test]
fn remove_with_unresolvable_plugin_keeps_the_record() {
    let (_dir, library, registry, _recorder) = setup();
    let store = library.store(Family::Pod).unwrap();

    // No settings mapping for this format
    let uuid = store.add(&registry, Resource::new("image/png")).unwrap();

    assert!(store.remove(&registry, uuid).is_err());
    assert!(store.get(uuid).unwrap().is_some());
}

#[test]
fn add_persists_even_when_the_hook_cannot_resolve() {
    let (_dir, library, registry, recorder) = setup();
    let store = library.store(Family::Pod).unwrap();

    let uuid = store.add(&registry, Resource::new("image/png")).unwrap();

    assert!(store.get(uuid).unwrap().is_some());
    assert!(recorder.calls.lock().unwrap().is_empty());
}

#[test]
fn missing_collection_file_bootstraps_an_empty_document() {
    let dir = TempDir::new().unwrap();
    let library = Library::new(dir.path());
    let store = library.store(Family::Pod).unwrap();

    assert!(store.list().unwrap().is_empty());

    let content = fs::read_to_string(store.file()).unwrap();
    let document: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(document, json!({ "pods": {} }));
}

#[test]
fn modify_and_modify_extra_roundtrip_through_the_library() {
    let (_dir, library, registry, _recorder) = setup();
    let store = library.store(Family::Pod).unwrap();

    let uuid = store
        .add(&registry, Resource::new("application/x-tex"))
        .unwrap();

    store.modify(uuid, &fields(json!({"a": 1}))).unwrap();
    let entry = store.modify(uuid, &fields(json!({"b": 2}))).unwrap();
    assert_eq!(entry.resource.fields["a"], json!(1));
    assert_eq!(entry.resource.fields["b"], json!(2));

    store
        .modify_extra(uuid, "p1", &fields(json!({"x": 1})))
        .unwrap();
    let entry = store
        .modify_extra(uuid, "p2", &fields(json!({"y": 2})))
        .unwrap();
    assert_eq!(entry.resource.extra["p1"], fields(json!({"x": 1})));
    assert_eq!(entry.resource.extra["p2"], fields(json!({"y": 2})));

    // Unknown uuid fails and changes nothing
    assert!(store.modify(Uuid::new_v4(), &FieldMap::new()).is_err());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn resolution_prefers_the_settings_override() {
    let dir = TempDir::new().unwrap();
    let library = Library::new(dir.path());

    let registry = Registry::new();
    for id in ["A", "B"] {
        registry.register(PluginDescriptor::client(
            PluginMetadata::new(Family::Pod, id, "fmt"),
            Component::new(id),
        ));
    }

    fs::write(
        library.paths().index_file(),
        r#"{ "formats": { "fmt": ["B", "A"] } }"#,
    )
    .unwrap();
    fs::write(
        library.paths().settings_file(),
        r#"{ "mimesToPlugin": { "fmt": "A" } }"#,
    )
    .unwrap();

    let plugin = resolve_by_format(
        &registry,
        &library.settings_store(),
        &library.index_store(),
        Family::Pod,
        "fmt",
    )
    .unwrap();
    assert_eq!(plugin.metadata.id, "A");

    // Without the override the index decides, in order
    fs::write(library.paths().settings_file(), "{}").unwrap();
    let plugin = resolve_by_format(
        &registry,
        &library.settings_store(),
        &library.index_store(),
        Family::Pod,
        "fmt",
    )
    .unwrap();
    assert_eq!(plugin.metadata.id, "B");
}
