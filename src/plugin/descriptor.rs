//! Plugin descriptors and capabilities
//!
//! A descriptor is the registered capability bundle for one `(family, id)`
//! pair. Server-side plugins carry lifecycle hooks; client-side plugins
//! carry an opaque UI component reference; a plugin may carry both. The
//! capability set is closed so callers check what a plugin can do
//! explicitly instead of probing optional fields.

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{Family, Resource};

/// Identity and advertised format of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Family this plugin belongs to
    pub family: Family,

    /// Plugin id, unique within the family
    pub id: String,

    /// Content format this plugin handles
    pub format: String,
}

impl PluginMetadata {
    pub fn new(
        family: Family,
        id: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            family,
            id: id.into(),
            format: format.into(),
        }
    }
}

/// Opaque reference to a UI component registered by a client plugin
///
/// The core never interprets it; the out-of-scope UI layer dereferences the
/// name at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component(String);

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Opaque plugin-managed state, produced by `make_state` and consumed by
/// the lifecycle hooks of the same plugin
pub type PluginState = Box<dyn Any + Send>;

/// Context for [`LifecycleHooks::make_state`]
pub struct StateContext<'a> {
    /// The resource's sharded payload directory
    pub dir: &'a Path,

    /// The resource record the event is about
    pub resource: &'a Resource,
}

/// Context for the add/remove lifecycle hooks
pub struct HookContext<'a> {
    /// The resource's sharded payload directory
    pub dir: &'a Path,

    /// State produced by `make_state` for this invocation
    pub state: PluginState,

    /// The resource record the event is about
    pub resource: &'a Resource,
}

/// Lifecycle callbacks a server-side plugin attaches to resource events
///
/// `on_add` and `on_remove` default to no-ops, so a plugin may implement
/// either, both, or neither.
pub trait LifecycleHooks: Send + Sync {
    /// Materializes plugin-private state for one hook invocation
    fn make_state(&self, ctx: &StateContext<'_>) -> Result<PluginState>;

    /// Invoked after a resource was persisted and its directory created
    fn on_add(&self, ctx: HookContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Invoked before a resource record is deleted
    fn on_remove(&self, ctx: HookContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// What a registered plugin can do
pub enum Capability {
    /// Server-side lifecycle hooks
    Hooks(Arc<dyn LifecycleHooks>),

    /// Client-side UI component
    Component(Component),

    /// Both sides
    Full {
        hooks: Arc<dyn LifecycleHooks>,
        component: Component,
    },
}

impl Capability {
    /// Returns the lifecycle hooks, if this plugin carries any
    pub fn hooks(&self) -> Option<&Arc<dyn LifecycleHooks>> {
        match self {
            Capability::Hooks(hooks) | Capability::Full { hooks, .. } => Some(hooks),
            Capability::Component(_) => None,
        }
    }

    /// Returns the component reference, if this plugin carries one
    pub fn component(&self) -> Option<&Component> {
        match self {
            Capability::Component(component) | Capability::Full { component, .. } => {
                Some(component)
            }
            Capability::Hooks(_) => None,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Hooks(_) => f.write_str("Hooks"),
            Capability::Component(component) => {
                f.debug_tuple("Component").field(component).finish()
            }
            Capability::Full { component, .. } => {
                f.debug_struct("Full").field("component", component).finish()
            }
        }
    }
}

/// The registered capability bundle for one `(family, id)` pair
#[derive(Debug)]
pub struct PluginDescriptor {
    pub metadata: PluginMetadata,
    pub capability: Capability,
}

impl PluginDescriptor {
    /// A server-side descriptor carrying lifecycle hooks
    pub fn server(metadata: PluginMetadata, hooks: Arc<dyn LifecycleHooks>) -> Self {
        Self {
            metadata,
            capability: Capability::Hooks(hooks),
        }
    }

    /// A client-side descriptor carrying a UI component reference
    pub fn client(metadata: PluginMetadata, component: Component) -> Self {
        Self {
            metadata,
            capability: Capability::Component(component),
        }
    }

    /// A descriptor carrying both hooks and a component
    pub fn full(
        metadata: PluginMetadata,
        hooks: Arc<dyn LifecycleHooks>,
        component: Component,
    ) -> Self {
        Self {
            metadata,
            capability: Capability::Full { hooks, component },
        }
    }
}
