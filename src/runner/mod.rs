//! runner
//!
//! The Run Controller: the single entry point that orchestrates
//! resolve -> bind -> pre-hooks -> execute -> post-hooks.
//!
//! # Architecture
//!
//! A [`Runner`] owns all process-wide configuration: the manifest, the hook
//! lists, the toolbox seed, the output sink, and the error-to-exit-code
//! mapping. Configuration happens once, through the fluent builder; after
//! that every [`Runner::run`] invocation is independent, sharing only
//! read-mostly state plus the sink's dirty flag (reset at the start of
//! each run).
//!
//! The run lifecycle is a strictly ordered chain:
//!
//! ```text
//! Resolving -> Binding -> PreHooks -> Executing -> PostHooks -> Done
//! ```
//!
//! with error handling reachable from every phase. Failures are caught
//! here and nowhere else: components below return typed errors, the
//! controller maps them to an exit code, optionally renders the failing
//! command's help page (only when the run has produced no output yet), and
//! always prints a single formatted error line.
//!
//! # Invariants
//!
//! - Hooks and the handler run sequentially, one at a time, in
//!   registration order.
//! - A failing pre-run hook prevents the handler entirely; a failing
//!   post-run hook does not undo handler effects.
//! - Unknown commands get an error line but no help page (they have none).
//! - The update advisory runs only after a successful run and never
//!   changes the exit code.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use thiserror::Error;

use crate::bind::{bind, BindError};
use crate::help::{self, HelpContext};
use crate::hooks::{HookLists, Plugin};
use crate::manifest::{Manifest, ResolveError, NAMESPACE_SEPARATOR};
use crate::output::OutputSink;
use crate::toolbox::{Extensions, Prompt, StdinPrompt, Toolbox};
use crate::update::UpdateNotifier;

/// Which hook list a failing hook belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Pre => write!(f, "pre-run"),
            HookPhase::Post => write!(f, "post-run"),
        }
    }
}

/// Coarse error classification, for error-to-exit-code mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownCommand,
    MissingOption,
    MissingParameter,
    ValidationFailure,
    HandlerFailure,
    HookFailure,
}

/// Any failure a run can end with. Caught once, by the controller.
#[derive(Debug, Error)]
pub enum RunError {
    /// Command token matched no manifest entry.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Option/argument binding failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The command handler itself failed.
    #[error("{0}")]
    Handler(anyhow::Error),

    /// A pre-run or post-run hook failed.
    #[error("{phase} hook failed: {source}")]
    Hook {
        phase: HookPhase,
        source: anyhow::Error,
    },
}

impl RunError {
    /// Classify this error for exit-code mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Resolve(ResolveError::UnknownCommand(_)) => ErrorKind::UnknownCommand,
            RunError::Bind(BindError::MissingOption(_)) => ErrorKind::MissingOption,
            RunError::Bind(BindError::MissingParameter(_)) => ErrorKind::MissingParameter,
            RunError::Bind(BindError::Validation { .. }) => ErrorKind::ValidationFailure,
            RunError::Handler(_) => ErrorKind::HandlerFailure,
            RunError::Hook { .. } => ErrorKind::HookFailure,
        }
    }
}

/// Error-to-exit-code mapping.
pub type ErrorCodeFn = dyn Fn(&RunError) -> i32 + Send + Sync;

/// The configured application: manifest, hooks, toolbox seed, and output.
///
/// # Example
///
/// ```no_run
/// use tiller::manifest::{ArgSpec, CommandSpec, Manifest};
/// use tiller::runner::Runner;
///
/// # async fn example() {
/// let runner = Runner::build("acme-cli")
///     .execname("acme")
///     .version("1.2.3")
///     .description("The ACME command line")
///     .commands(Manifest::new().command(
///         "greet",
///         CommandSpec::new()
///             .summary("Say hello")
///             .arg("name", ArgSpec::new())
///             .run(|toolbox, params| async move {
///                 toolbox.log(format!("hi {}", params.text("name").unwrap_or("")));
///                 Ok(None)
///             }),
///     ))
///     .done();
///
/// let code = runner.run().await;
/// std::process::exit(code);
/// # }
/// ```
pub struct Runner {
    pkgname: String,
    execname: Option<String>,
    version: String,
    description: Option<String>,
    manifest: Manifest,
    hooks: HookLists,
    extensions: Extensions,
    output: OutputSink,
    prompt: Arc<dyn Prompt>,
    error_code: Box<ErrorCodeFn>,
    notifier: Option<Arc<dyn UpdateNotifier>>,
}

impl Runner {
    /// Start configuring a runner for the named package.
    pub fn build(pkgname: impl Into<String>) -> Self {
        Self {
            pkgname: pkgname.into(),
            execname: None,
            version: "0.0.0".to_string(),
            description: None,
            manifest: Manifest::new(),
            hooks: HookLists::default(),
            extensions: Extensions::new(),
            output: OutputSink::stdout(),
            prompt: Arc::new(StdinPrompt),
            error_code: Box::new(|_error| 1),
            notifier: None,
        }
    }

    /// Set the executable name shown in USAGE lines. Defaults to the file
    /// stem of the process's own `argv[0]`.
    pub fn execname(mut self, execname: impl Into<String>) -> Self {
        self.execname = Some(execname.into());
        self
    }

    /// Set the version string for the top-level VERSION section.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the description line for the top-level help page.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Install the command manifest.
    pub fn commands(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Register plugins, in order.
    ///
    /// Each plugin's `initialize` sees the toolbox as built so far and its
    /// contribution is merged additively: extensions into the toolbox,
    /// hooks appended to the pre-run/post-run lists.
    pub fn plugins(mut self, plugins: Vec<Box<dyn Plugin>>) -> Self {
        for plugin in plugins {
            let view = self.toolbox();
            let mut contribution = plugin.initialize(&view);
            let extensions = std::mem::take(&mut contribution.toolbox);
            self.extensions.extend(extensions);
            self.hooks.absorb(&mut contribution);
        }
        self
    }

    /// Register a single plugin.
    pub fn plugin(self, plugin: impl Plugin + 'static) -> Self {
        self.plugins(vec![Box::new(plugin)])
    }

    /// Redirect all output through `sink`. Defaults to stdout.
    pub fn output<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.output = OutputSink::new(sink);
        self
    }

    /// Replace the prompt facility. Defaults to [`StdinPrompt`].
    pub fn prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Arc::new(prompt);
        self
    }

    /// Replace the error-to-exit-code mapping. Defaults to 1 for any error.
    pub fn error_code<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&RunError) -> i32 + Send + Sync + 'static,
    {
        self.error_code = Box::new(mapping);
        self
    }

    /// Install an update-advisory collaborator, consulted after successful
    /// runs.
    pub fn update_notifier(mut self, notifier: impl UpdateNotifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Finish configuration. Purely a chain terminator.
    pub fn done(self) -> Self {
        self
    }

    /// Run against the process's own arguments.
    pub async fn run(&self) -> i32 {
        let argv: Vec<String> = std::env::args().skip(1).collect();
        self.run_argv(argv).await
    }

    /// Run against an explicit argument vector.
    pub async fn run_with<I, S>(&self, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_argv(argv.into_iter().map(Into::into).collect())
            .await
    }

    async fn run_argv(&self, argv: Vec<String>) -> i32 {
        self.output.mark_clean();

        // Help short-circuits: no arguments, or the help pseudo-command.
        if argv.is_empty() || (argv.len() == 1 && argv[0] == "help") {
            self.show_help(None);
            return 0;
        }
        if argv.len() == 2 && argv[0] == "help" {
            return match self.render_help(Some(&argv[1])) {
                Ok(page) => {
                    self.output.write(&page);
                    0
                }
                // Unknown commands have no help page.
                Err(error) => self.fail(error.into(), None),
            };
        }

        // A trailing separator means "show this group's help".
        let raw = argv[0].as_str();
        let (token, group_help) = match raw.strip_suffix(NAMESPACE_SEPARATOR) {
            Some(stripped) => (stripped, true),
            None => (raw, false),
        };

        tracing::debug!(command = token, "resolving");
        let resolved = match self.manifest.resolve(token) {
            Ok(resolved) => resolved,
            Err(error) => return self.fail(error.into(), None),
        };

        // Non-executable entries and explicit help requests short-circuit
        // to the command's help page.
        if group_help || !resolved.is_executable() {
            self.show_help(Some(token));
            return 0;
        }
        if argv[1..].iter().any(|arg| arg == "-h" || arg == "--help") {
            self.show_help(Some(token));
            return 0;
        }

        tracing::debug!(command = token, "binding");
        let params = match bind(&resolved.spec, &argv) {
            Ok(params) => params,
            Err(error) => return self.fail(error.into(), Some(token)),
        };

        let spec = resolved.spec.clone();
        let Some(handler) = spec.handler.clone() else {
            // Unreachable: non-executable entries short-circuited above.
            self.show_help(Some(token));
            return 0;
        };
        let toolbox = self.toolbox();

        tracing::debug!(hooks = self.hooks.prerun.len(), "running pre-run hooks");
        for hook in &self.hooks.prerun {
            if let Err(source) = hook(toolbox.clone(), spec.clone(), params.clone()).await {
                let error = RunError::Hook {
                    phase: HookPhase::Pre,
                    source,
                };
                return self.fail(error, Some(token));
            }
        }

        tracing::debug!(command = token, "executing");
        let code = match handler(toolbox.clone(), params.clone()).await {
            Ok(code) => code.unwrap_or(0),
            Err(source) => return self.fail(RunError::Handler(source), Some(token)),
        };

        tracing::debug!(hooks = self.hooks.postrun.len(), "running post-run hooks");
        for hook in &self.hooks.postrun {
            if let Err(source) = hook(toolbox.clone(), spec.clone(), params.clone()).await {
                let error = RunError::Hook {
                    phase: HookPhase::Post,
                    source,
                };
                return self.fail(error, Some(token));
            }
        }

        if code == 0 {
            if let Some(notifier) = &self.notifier {
                if let Some(advisory) = notifier.advisory().await {
                    self.output.line(&advisory);
                }
            }
        }

        code
    }

    /// Terminal error state: map the exit code, maybe show the failing
    /// command's help page, always print one formatted error line.
    fn fail(&self, error: RunError, known_command: Option<&str>) -> i32 {
        let code = (self.error_code)(&error);
        tracing::debug!(kind = ?error.kind(), code, "run failed");

        if let Some(name) = known_command {
            // A help page would corrupt output the command already
            // streamed, so it is gated on the dirty flag.
            if !self.output.was_written_since_mark() {
                if let Ok(page) = self.render_help(Some(name)) {
                    self.output.write(&page);
                }
            }
        }

        self.output
            .line(&format!("{} {}", "ERROR:".bright_red(), error));
        code
    }

    fn render_help(&self, command: Option<&str>) -> Result<String, ResolveError> {
        let execname = self.resolved_execname();
        let ctx = HelpContext {
            manifest: &self.manifest,
            pkgname: &self.pkgname,
            execname: &execname,
            version: &self.version,
            description: self.description.as_deref(),
        };
        help::render(&ctx, command)
    }

    fn show_help(&self, command: Option<&str>) {
        if let Ok(page) = self.render_help(command) {
            self.output.write(&page);
        }
    }

    fn resolved_execname(&self) -> String {
        if let Some(execname) = &self.execname {
            return execname.clone();
        }
        match std::env::args().next() {
            Some(arg0) => {
                let stem = Path::new(&arg0)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned());
                stem.unwrap_or(arg0)
            }
            None => self.pkgname.clone(),
        }
    }

    fn toolbox(&self) -> Toolbox {
        Toolbox::new(
            self.output.clone(),
            self.prompt.clone(),
            Arc::new(self.extensions.clone()),
        )
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("pkgname", &self.pkgname)
            .field("version", &self.version)
            .field("hooks", &self.hooks)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
