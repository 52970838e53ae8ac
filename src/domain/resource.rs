//! Resource records
//!
//! A resource is one persisted entry in a family collection. Records are
//! open: beyond the declared `format` they carry arbitrary family-specific
//! fields, plus an `extra` namespace where plugins keep private per-resource
//! state keyed by plugin id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An open bag of JSON fields
pub type FieldMap = serde_json::Map<String, Value>;

/// One entry in a family collection
///
/// Deserializing through this type is the validation boundary: raw JSON
/// that lacks a string `format`, or whose `extra` values are not objects,
/// is rejected before it reaches any business logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Declared content format (e.g. `application/x-tex`), used to select
    /// the handling plugin
    pub format: String,

    /// Plugin-private state, keyed by plugin id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, FieldMap>,

    /// Family-specific open fields
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Resource {
    /// Creates a record with the given format and no other fields
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            extra: BTreeMap::new(),
            fields: FieldMap::new(),
        }
    }

    /// Adds an open field (builder style)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a copy with the top-level keys of `data` merged over this
    /// record
    ///
    /// Keys in `data` overwrite, everything else is preserved. The merge is
    /// performed on the serialized value and revalidated, so `data` may
    /// rewrite `format` (to another string) or replace `extra` wholesale,
    /// and a merge that breaks the record shape is an error.
    pub fn merged(&self, data: &FieldMap) -> serde_json::Result<Resource> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(object) = &mut value {
            for (key, field) in data {
                object.insert(key.clone(), field.clone());
            }
        }
        serde_json::from_value(value)
    }

    /// Returns a copy with `data` merged into `extra[field]`
    ///
    /// Both `extra` and `extra[field]` are created as empty maps when
    /// missing. Other plugins' namespaces are untouched.
    pub fn merged_extra(&self, field: &str, data: &FieldMap) -> Resource {
        let mut next = self.clone();
        let slot = next.extra.entry(field.to_string()).or_default();
        for (key, value) in data {
            slot.insert(key.clone(), value.clone());
        }
        next
    }
}

/// A resource record with its collection key attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub uuid: Uuid,

    #[serde(flatten)]
    pub resource: Resource,
}
