//! hooks
//!
//! The plugin hook pipeline: ordered pre-run and post-run functions
//! contributed at configuration time.
//!
//! # Architecture
//!
//! A [`Plugin`] is asked once, during configuration, to `initialize`
//! against the toolbox as built so far. It answers with a
//! [`HookContribution`]: toolbox extensions to merge plus pre-run and
//! post-run hooks to append. All fields default to empty, so a plugin
//! contributes exactly what it needs and nothing is ambiguous about
//! absent fields.
//!
//! # Invariants
//!
//! - Registration order is execution order; the lists are never reordered.
//! - Hooks run sequentially, each to completion before the next begins.
//! - A failing pre-run hook prevents the handler and the remaining hooks;
//!   a failing post-run hook aborts the remaining post-run hooks but does
//!   not undo handler effects.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::bind::Params;
use crate::manifest::CommandSpec;
use crate::toolbox::{Extensions, Toolbox};

/// Boxed future returned by hooks.
pub type HookFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A pre-run or post-run hook: `(toolbox, resolved command spec, bound params)`.
pub type HookFn = Arc<dyn Fn(Toolbox, Arc<CommandSpec>, Params) -> HookFuture + Send + Sync>;

/// Wrap an async closure as a [`HookFn`].
///
/// # Example
///
/// ```
/// use tiller::hooks::hook;
///
/// let timing = hook(|toolbox, _spec, _params| async move {
///     toolbox.log("starting");
///     Ok(())
/// });
/// ```
pub fn hook<F, Fut>(f: F) -> HookFn
where
    F: Fn(Toolbox, Arc<CommandSpec>, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |toolbox, spec, params| Box::pin(f(toolbox, spec, params)))
}

/// What a plugin contributes at configuration time. Empty by default.
#[derive(Default)]
pub struct HookContribution {
    /// Extensions merged additively into the toolbox.
    pub toolbox: Extensions,
    /// Hooks appended to the pre-run list.
    pub prerun: Vec<HookFn>,
    /// Hooks appended to the post-run list.
    pub postrun: Vec<HookFn>,
}

impl HookContribution {
    /// An empty contribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toolbox extension.
    pub fn extend(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.toolbox.insert(key.into(), value);
        self
    }

    /// Append a pre-run hook.
    pub fn prerun<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Toolbox, Arc<CommandSpec>, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.prerun.push(hook(f));
        self
    }

    /// Append a post-run hook.
    pub fn postrun<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Toolbox, Arc<CommandSpec>, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.postrun.push(hook(f));
        self
    }
}

impl std::fmt::Debug for HookContribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookContribution")
            .field("toolbox", &self.toolbox.keys().collect::<Vec<_>>())
            .field("prerun", &self.prerun.len())
            .field("postrun", &self.postrun.len())
            .finish()
    }
}

/// A plugin registered at configuration time.
pub trait Plugin: Send + Sync {
    /// Called once during configuration with the toolbox as built so far.
    fn initialize(&self, toolbox: &Toolbox) -> HookContribution;
}

/// The two ordered hook lists owned by the run controller.
#[derive(Default)]
pub struct HookLists {
    /// Hooks run before the handler, in registration order.
    pub prerun: Vec<HookFn>,
    /// Hooks run after the handler, in registration order.
    pub postrun: Vec<HookFn>,
}

impl HookLists {
    /// Append a contribution's hooks, preserving registration order.
    pub fn absorb(&mut self, contribution: &mut HookContribution) {
        self.prerun.append(&mut contribution.prerun);
        self.postrun.append(&mut contribution.postrun);
    }
}

impl std::fmt::Debug for HookLists {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookLists")
            .field("prerun", &self.prerun.len())
            .field("postrun", &self.postrun.len())
            .finish()
    }
}
