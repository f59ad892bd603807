//! output
//!
//! The single chokepoint for user-visible text.
//!
//! # Design
//!
//! Every piece of text the framework produces - help pages, error lines,
//! handler output via [`crate::toolbox::Toolbox::log`] - flows through one
//! [`OutputSink`]. The sink function is injected at configuration time
//! (defaulting to stdout), so embedders and tests can capture output
//! without touching process streams.
//!
//! The sink also tracks whether anything has been written since the last
//! mark. The run controller uses this to decide whether an error may still
//! be preceded by a help page: once a command has started streaming output,
//! injecting an unrelated help page would corrupt it.
//!
//! # Invariants
//!
//! - The framework never writes to stdout/stderr directly; all text goes
//!   through the configured sink.
//! - The dirty flag is set by every write and cleared only by
//!   [`OutputSink::mark_clean`], called once at the start of each run.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sink function signature: receives already-formatted text.
pub type SinkFn = dyn Fn(&str) + Send + Sync;

/// Shared handle to the output sink.
///
/// Cheap to clone; all clones share the same sink and dirty flag.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Inner>,
}

struct Inner {
    sink: Box<SinkFn>,
    dirty: AtomicBool,
}

impl OutputSink {
    /// Create a sink backed by an arbitrary function.
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                sink: Box::new(sink),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Create the default stdout-backed sink.
    pub fn stdout() -> Self {
        Self::new(|text| {
            let mut out = std::io::stdout();
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        })
    }

    /// Write raw text through the sink and set the dirty flag.
    pub fn write(&self, text: &str) {
        (self.inner.sink)(text);
        self.inner.dirty.store(true, Ordering::SeqCst);
    }

    /// Write text followed by a newline.
    pub fn line(&self, text: &str) {
        self.write(&format!("{}\n", text));
    }

    /// Has anything been written since the last [`OutputSink::mark_clean`]?
    pub fn was_written_since_mark(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Reset the dirty flag. Called at the start of every run.
    pub fn mark_clean(&self) {
        self.inner.dirty.store(false, Ordering::SeqCst);
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("dirty", &self.was_written_since_mark())
            .finish_non_exhaustive()
    }
}
