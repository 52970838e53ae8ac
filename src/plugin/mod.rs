//! # Plugin System
//!
//! Extensibility layer for pluggable content format handlers.
//!
//! ## Overview
//!
//! Any module may register a [`PluginDescriptor`] at process start. A
//! descriptor advertises a `(family, id)` identity, the content format it
//! handles, and a closed capability set: server-side lifecycle hooks, a
//! client-side UI component reference, or both.
//!
//! ## Lookup paths
//!
//! | Need | Entry point |
//! |------|-------------|
//! | A specific plugin | [`Registry::get`] |
//! | Everything in a family | [`Registry::list`] |
//! | Whoever handles a format | [`resolve_by_format`] |
//!
//! Format resolution is two-tier: the persisted settings override always
//! wins, then the discovered format index supplies the first capable
//! candidate.
//!
//! ## Lifecycle hooks
//!
//! On resource add/remove the [`HookDispatcher`] resolves the owning plugin
//! from the resource's declared format, materializes plugin-private state
//! via `make_state`, and invokes `on_add`/`on_remove` with the resource's
//! payload directory and record.
//!
//! ## Key Types
//!
//! - [`Registry`] - Append-only descriptor registry, one instance per side
//! - [`PluginDescriptor`] / [`Capability`] - What a plugin can do
//! - [`LifecycleHooks`] - Trait server plugins implement
//! - [`HookDispatcher`] - Resolves and invokes hooks on resource events

mod builtin;
mod descriptor;
mod hooks;
mod registry;
mod resolve;

pub use builtin::{register_builtins, LatexPod, PlaintextPod};
pub use descriptor::{
    Capability, Component, HookContext, LifecycleHooks, PluginDescriptor, PluginMetadata,
    PluginState, StateContext,
};
pub use hooks::{HookDispatcher, HookError, HookEvent};
pub use registry::{Registry, RegistryError};
pub use resolve::{resolve_by_format, ResolveError};
