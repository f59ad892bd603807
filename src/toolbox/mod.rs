//! toolbox
//!
//! The shared context object passed to every handler and hook.
//!
//! # Design
//!
//! The toolbox is an additive bag seeded at configuration time: an output
//! handle, a prompt facility, and structured extensions contributed by
//! plugin `initialize` hooks. It is frozen before the first run - handlers
//! and hooks receive cheap clones and may read it freely, but the core
//! never mutates it during a run. Plugins that stash interior-mutable
//! state inside an extension own the isolation discipline for it.
//!
//! # Invariants
//!
//! - Extensions are merged additively at configuration time; nothing is
//!   ever removed.
//! - [`Toolbox::log`] funnels through the one [`OutputSink`], so handler
//!   output participates in the run controller's dirty-flag tracking.

pub mod prompt;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::output::OutputSink;

pub use prompt::{Prompt, PromptError, StdinPrompt};

/// Structured plugin-contributed extensions, keyed by name.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Shared, additive context passed to every handler and hook.
///
/// Cheap to clone; all clones share the same sink, prompt, and frozen
/// extension map.
#[derive(Clone)]
pub struct Toolbox {
    output: OutputSink,
    prompt: Arc<dyn Prompt>,
    extensions: Arc<Extensions>,
}

impl Toolbox {
    /// Assemble a toolbox. Called by the run controller once per run.
    pub fn new(output: OutputSink, prompt: Arc<dyn Prompt>, extensions: Arc<Extensions>) -> Self {
        Self {
            output,
            prompt,
            extensions,
        }
    }

    /// Write a message followed by a newline through the output sink.
    pub fn log(&self, message: impl AsRef<str>) {
        self.output.line(message.as_ref());
    }

    /// Write raw text through the output sink, no newline appended.
    pub fn write(&self, text: impl AsRef<str>) {
        self.output.write(text.as_ref());
    }

    /// The underlying output handle.
    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    /// The prompt facility.
    pub fn prompt(&self) -> &dyn Prompt {
        self.prompt.as_ref()
    }

    /// Look up a plugin-contributed extension by key.
    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }

    /// Iterate all extensions in contribution order.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.extensions
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbox")
            .field("output", &self.output)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
