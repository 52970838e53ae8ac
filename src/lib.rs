//! lode - A local-first library for typed content resources
//!
//! lode keeps a library of typed content "resources" (pods, orbs, links,
//! models) as JSON collections with sharded payload directories, and routes
//! resource lifecycle events to dynamically registered format-handler
//! plugins.

pub mod cli;
pub mod domain;
pub mod plugin;
pub mod storage;

pub use domain::{Family, Resource, ResourceEntry};
pub use plugin::{PluginDescriptor, Registry};
pub use storage::Library;
