//! Built-in pod format handlers
//!
//! First-party server-side plugins that register at process start, before
//! any user resources are touched. Each one seeds the payload directory of
//! a new pod with the file its format expects.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::domain::Family;

use super::descriptor::{
    HookContext, LifecycleHooks, PluginDescriptor, PluginMetadata, PluginState, StateContext,
};
use super::registry::Registry;

/// Payload location shared by the built-in pod handlers
struct PodFile {
    path: PathBuf,
}

impl PodFile {
    fn from_state(state: PluginState) -> Result<Box<PodFile>> {
        state
            .downcast::<PodFile>()
            .map_err(|_| anyhow!("Pod hook state has an unexpected type"))
    }

    fn seed(&self, contents: &str) -> Result<()> {
        if !self.path.exists() {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to seed pod file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Handler for `text/plain` pods
pub struct PlaintextPod;

impl LifecycleHooks for PlaintextPod {
    fn make_state(&self, ctx: &StateContext<'_>) -> Result<PluginState> {
        Ok(Box::new(PodFile {
            path: ctx.dir.join("pod.txt"),
        }))
    }

    fn on_add(&self, ctx: HookContext<'_>) -> Result<()> {
        PodFile::from_state(ctx.state)?.seed("")
    }
}

/// Handler for `application/x-tex` pods
pub struct LatexPod;

impl LifecycleHooks for LatexPod {
    fn make_state(&self, ctx: &StateContext<'_>) -> Result<PluginState> {
        Ok(Box::new(PodFile {
            path: ctx.dir.join("main.tex"),
        }))
    }

    fn on_add(&self, ctx: HookContext<'_>) -> Result<()> {
        PodFile::from_state(ctx.state)?.seed(
            "\\documentclass{article}\n\\begin{document}\n\n\\end{document}\n",
        )
    }
}

/// Registers every built-in plugin; safe to call more than once
pub fn register_builtins(registry: &Registry) {
    registry.register(PluginDescriptor::server(
        PluginMetadata::new(Family::Pod, "plaintext", "text/plain"),
        Arc::new(PlaintextPod),
    ));
    registry.register(PluginDescriptor::server(
        PluginMetadata::new(Family::Pod, "latex", "application/x-tex"),
        Arc::new(LatexPod),
    ));
}
