//! update
//!
//! Version-advisory side channel.
//!
//! # Design
//!
//! The core performs no network I/O. Update checking is an external
//! collaborator behind the [`UpdateNotifier`] trait: after a successful
//! run, the run controller asks it for an optional advisory message and
//! writes it through the output sink. The advisory never alters the exit
//! code or control flow, and failures inside a notifier are its own
//! problem to swallow - the trait cannot report one.

use async_trait::async_trait;

/// External update-check collaborator.
#[async_trait]
pub trait UpdateNotifier: Send + Sync {
    /// Maybe produce an advisory message (e.g. "a newer version exists").
    ///
    /// Returning `None` keeps the run silent.
    async fn advisory(&self) -> Option<String>;
}

/// The default notifier: never advises.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUpdateCheck;

#[async_trait]
impl UpdateNotifier for NoUpdateCheck {
    async fn advisory(&self) -> Option<String> {
        None
    }
}
