//! Domain models for lode
//!
//! Contains the resource families and record types without any I/O concerns.

mod family;
mod resource;

pub use family::Family;
pub use resource::{FieldMap, Resource, ResourceEntry};
