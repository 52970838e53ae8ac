//! # Storage Layer
//!
//! Persistence layer for lode's resource collections and documents.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Collections | JSON (one document per family) | `<dataDir>/<plural>.json` |
//! | Payloads | plugin-managed files | `<dataDir>/<plural>/<uuid[0..2]>/<uuid[2..]>` |
//! | Settings | JSON | `<dataDir>/settings.json` |
//! | Format index | JSON | `<dataDir>/index.json` |
//!
//! ## Consistency
//!
//! - Every write is atomic (temp file + rename) under an `fs2` lock
//! - There is no cross-operation lock: concurrent read-modify-write cycles
//!   on one collection are last-writer-wins
//! - Missing documents bootstrap themselves on first read
//!
//! ## Key Types
//!
//! - [`Library`] - Entry point for one data directory
//! - [`CollectionStore`] - CRUD over one family's JSON collection
//! - [`DataPaths`] - Pure path derivation, including payload sharding
//! - [`Settings`] / [`FormatIndex`] - The read-only resolution documents

mod collection;
mod library;
mod paths;
mod settings;

pub use collection::{CollectionError, CollectionStore};
pub use library::Library;
pub use paths::DataPaths;
pub use settings::{
    FormatIndex, IndexSource, JsonIndexStore, JsonSettingsStore, Settings, SettingsSource,
};
