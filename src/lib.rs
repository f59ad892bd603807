//! Tiller - a declarative, manifest-driven command-line framework
//!
//! Tiller resolves a process's argument vector into a validated, typed call
//! to a command handler, using a static manifest that describes commands,
//! subcommands, options, and positional parameters. The same manifest
//! drives help rendering, so usage text can never drift from execution
//! behavior. Plugins extend a shared toolbox and contribute pre-/post-run
//! hooks around every command.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`manifest`] - Static command model and the namespace-aware resolver
//! - [`bind`] - Flag tokenizer and option/argument binder
//! - [`help`] - Manifest-derived help renderer (pure)
//! - [`hooks`] - Plugin interface and the ordered hook pipeline
//! - [`toolbox`] - Shared context passed to handlers and hooks
//! - [`output`] - The single output chokepoint with dirty-flag tracking
//! - [`update`] - Version-advisory interface (no network in the core)
//! - [`runner`] - Run controller orchestrating the whole lifecycle
//!
//! # Correctness Invariants
//!
//! 1. The manifest and hook lists are configured once and read-only during
//!    runs.
//! 2. All user-visible text flows through one injected output sink.
//! 3. Failures are caught only by the run controller, which maps them to
//!    an exit code and a single formatted error line.
//! 4. Hooks and handlers execute sequentially, in registration order.
//!
//! # Example
//!
//! ```no_run
//! use tiller::manifest::{ArgSpec, CommandSpec, Manifest};
//! use tiller::runner::Runner;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::build("acme-cli")
//!         .execname("acme")
//!         .version(env!("CARGO_PKG_VERSION"))
//!         .description("The ACME command line")
//!         .commands(Manifest::new().command(
//!             "greet",
//!             CommandSpec::new()
//!                 .summary("Say hello")
//!                 .arg("name", ArgSpec::new().describe("Who to greet"))
//!                 .run(|toolbox, params| async move {
//!                     toolbox.log(format!("hi {}", params.text("name").unwrap_or("")));
//!                     Ok(None)
//!                 }),
//!         ))
//!         .done();
//!
//!     std::process::exit(runner.run().await);
//! }
//! ```

pub mod bind;
pub mod help;
pub mod hooks;
pub mod manifest;
pub mod output;
pub mod runner;
pub mod toolbox;
pub mod update;

pub use bind::{bind, BindError, Params, Value};
pub use hooks::{hook, HookContribution, Plugin};
pub use manifest::{ArgSpec, CommandSpec, Manifest, OptionSpec, ResolveError};
pub use output::OutputSink;
pub use runner::{ErrorKind, RunError, Runner};
pub use toolbox::{Prompt, StdinPrompt, Toolbox};
pub use update::UpdateNotifier;
