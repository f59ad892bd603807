//! manifest
//!
//! The Manifest Model: a static, read-only description of every command
//! the application exposes.
//!
//! # Architecture
//!
//! A [`Manifest`] maps possibly-namespaced command names (`"db:migrate"`)
//! to [`CommandSpec`] entries. Names are parsed once at configuration time
//! into a command tree (see [`tree`]); lookups never re-split keys.
//!
//! The same manifest drives three consumers:
//!
//! - the resolver ([`Manifest::resolve`]), which maps a command token to
//!   an entry and its descendants
//! - the binder ([`crate::bind`]), which reads option and parameter specs
//! - the help renderer ([`crate::help`]), which derives every help section
//!   from the specs - help text is never a separate data source
//!
//! # Invariants
//!
//! - The manifest is built once, before runs begin, and never mutated after.
//! - An entry without a handler is a group header: resolvable for help,
//!   never executable.
//! - Every [`OptionSpec`] carries at least one flag alias.

pub mod tree;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::bind::Params;
use crate::toolbox::Toolbox;

pub use tree::{ChildEntry, ResolveError, ResolvedCommand};

/// Separator between namespace segments in command names.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Result of a command handler: an optional exit code.
///
/// `Ok(None)` means success with exit code 0. `Ok(Some(code))` sets the
/// process exit code explicitly. `Err` diverts the run to error handling.
pub type HandlerResult = anyhow::Result<Option<i32>>;

/// Boxed future returned by command handlers.
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// A command handler: `(toolbox, params) -> exit code`.
///
/// Handlers receive a cheap clone of the shared [`Toolbox`] and the fully
/// bound [`Params`] for this invocation.
pub type HandlerFn = Arc<dyn Fn(Toolbox, Params) -> HandlerFuture + Send + Sync>;

/// A positional-parameter validator. Invoked only when a value is present;
/// returns a descriptive error to reject it.
pub type ValidateFn = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

/// Whether an option expects a value or records bare presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionKind {
    /// Boolean flag; presence binds the option.
    #[default]
    Flag,
    /// String-valued option; the flag consumes a value.
    Value,
}

impl OptionKind {
    /// Does this option consume a value token?
    pub fn takes_value(self) -> bool {
        matches!(self, OptionKind::Value)
    }
}

/// Specification of a single command-line option.
///
/// # Example
///
/// ```
/// use tiller::manifest::OptionSpec;
///
/// let opt = OptionSpec::value("output")
///     .short("o")
///     .long("output")
///     .required()
///     .describe("Where to write the result");
/// assert_eq!(opt.canonical(), "-o output, --output=output");
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    /// Key under which the bound value appears in [`Params`].
    pub name: String,
    /// Single-dash alias, without the dash.
    pub short: Option<String>,
    /// Double-dash alias, without the dashes.
    pub long: Option<String>,
    /// Flag or value-taking.
    pub kind: OptionKind,
    /// Hard error before the handler runs if absent after binding.
    pub required: bool,
    /// One-line description for the OPTIONS help table.
    pub description: Option<String>,
}

impl OptionSpec {
    /// A boolean flag option.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            long: None,
            kind: OptionKind::Flag,
            required: false,
            description: None,
        }
    }

    /// A string-valued option.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::Value,
            ..Self::flag(name)
        }
    }

    /// Set the single-dash alias.
    pub fn short(mut self, alias: impl Into<String>) -> Self {
        self.short = Some(alias.into());
        self
    }

    /// Set the double-dash alias.
    pub fn long(mut self, alias: impl Into<String>) -> Self {
        self.long = Some(alias.into());
        self
    }

    /// Mark the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the help description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Does this spec declare at least one alias?
    pub fn has_alias(&self) -> bool {
        self.short.is_some() || self.long.is_some()
    }

    /// Canonical display form: `-s name, --long=name` for value options,
    /// `-s, --long` for flags. Used by both error messages and help tables.
    pub fn canonical(&self) -> String {
        let mut parts = Vec::new();
        if let Some(short) = &self.short {
            match self.kind {
                OptionKind::Flag => parts.push(format!("-{}", short)),
                OptionKind::Value => parts.push(format!("-{} {}", short, self.name)),
            }
        }
        if let Some(long) = &self.long {
            match self.kind {
                OptionKind::Flag => parts.push(format!("--{}", long)),
                OptionKind::Value => parts.push(format!("--{}={}", long, self.name)),
            }
        }
        parts.join(", ")
    }
}

/// Specification of a positional parameter.
///
/// Positional parameters bind in declaration order to the tokens left over
/// after flags are stripped.
#[derive(Clone, Default)]
pub struct ArgSpec {
    /// Absence of a token is not an error.
    pub optional: bool,
    /// One-line description for the PARAMETERS help table.
    pub description: Option<String>,
    /// Custom validator, run only when a value is present.
    pub validate: Option<ValidateFn>,
}

impl ArgSpec {
    /// A required positional parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the parameter as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the help description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a validator. Validation failures surface as-is in the
    /// formatted error line.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgSpec")
            .field("optional", &self.optional)
            .field("description", &self.description)
            .field("validate", &self.validate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// One manifest entry: everything the framework knows about a command.
///
/// An entry without a handler is a group header: it can be resolved to show
/// its help page and list its children, but it is never executed.
#[derive(Clone, Default)]
pub struct CommandSpec {
    /// One-line summary shown in COMMANDS listings and atop the help page.
    pub summary: Option<String>,
    /// Multi-line description for the DESCRIPTION help block.
    pub description: Option<String>,
    /// Option specs, in declaration order.
    pub options: Vec<OptionSpec>,
    /// Positional-parameter specs, keyed by name in declaration order.
    pub args: IndexMap<String, ArgSpec>,
    /// Example invocations for the EXAMPLES help block.
    pub examples: Vec<String>,
    /// The handler; `None` marks a non-executable group header.
    pub handler: Option<HandlerFn>,
}

impl CommandSpec {
    /// An empty spec; chain builder methods to fill it in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the one-line summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the multi-line description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an option spec.
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Append a positional-parameter spec.
    pub fn arg(mut self, name: impl Into<String>, arg: ArgSpec) -> Self {
        self.args.insert(name.into(), arg);
        self
    }

    /// Append an example invocation.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Attach the handler, making this a leaf (executable) command.
    pub fn run<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Toolbox, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |toolbox, params| {
            Box::pin(handler(toolbox, params))
        }));
        self
    }

    /// Is this entry executable?
    pub fn is_executable(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("summary", &self.summary)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("examples", &self.examples)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// The manifest: every command the application exposes, indexed by
/// possibly-namespaced name.
#[derive(Debug, Default)]
pub struct Manifest {
    tree: tree::CommandTree,
}

impl Manifest {
    /// An empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under `name`.
    ///
    /// Namespaced names (`"db:migrate"`) are split once here and slotted
    /// into the command tree. Registering the same name twice replaces the
    /// earlier entry.
    ///
    /// # Panics
    ///
    /// Panics if any option spec declares neither a short nor a long alias;
    /// that is a manifest-authoring error caught at configuration time.
    pub fn command(mut self, name: impl Into<String>, spec: CommandSpec) -> Self {
        let name = name.into();
        for option in &spec.options {
            assert!(
                option.has_alias(),
                "option \"{}\" of command \"{}\" declares no flag alias",
                option.name,
                name
            );
        }
        self.tree.insert(&name, Arc::new(spec));
        self
    }

    /// Resolve a command token to its entry and descendant listing.
    ///
    /// Resolution is exact-match against registered names: a name that only
    /// exists as an intermediate namespace segment is unknown.
    pub fn resolve(&self, token: &str) -> Result<ResolvedCommand, ResolveError> {
        self.tree.resolve(token)
    }

    /// Is `name` a registered command?
    pub fn contains(&self, name: &str) -> bool {
        self.tree.resolve(name).is_ok()
    }

    /// Look up a registered entry by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<CommandSpec>> {
        self.tree.resolve(name).ok().map(|resolved| resolved.spec)
    }

    /// All registered top-level commands (names without a namespace
    /// separator), in registration order.
    pub fn top_level(&self) -> Vec<ChildEntry> {
        self.tree.top_level()
    }

    /// Does the manifest contain no commands at all?
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_canonical_forms() {
        let flag = OptionSpec::flag("verbose").short("v").long("verbose");
        assert_eq!(flag.canonical(), "-v, --verbose");

        let value = OptionSpec::value("name").short("n").long("name");
        assert_eq!(value.canonical(), "-n name, --name=name");

        let short_only = OptionSpec::flag("quiet").short("q");
        assert_eq!(short_only.canonical(), "-q");

        let long_only = OptionSpec::value("db").long("database");
        assert_eq!(long_only.canonical(), "--database=db");
    }

    #[test]
    fn spec_without_handler_is_group_header() {
        let spec = CommandSpec::new().summary("Database operations");
        assert!(!spec.is_executable());

        let leaf = CommandSpec::new().run(|_toolbox, _params| async { Ok(None) });
        assert!(leaf.is_executable());
    }

    #[test]
    #[should_panic(expected = "declares no flag alias")]
    fn option_without_alias_is_rejected() {
        let _ = Manifest::new().command(
            "broken",
            CommandSpec::new().option(OptionSpec::flag("orphan")),
        );
    }

    #[test]
    fn arg_declaration_order_is_preserved() {
        let spec = CommandSpec::new()
            .arg("first", ArgSpec::new())
            .arg("second", ArgSpec::new().optional())
            .arg("third", ArgSpec::new());

        let names: Vec<_> = spec.args.keys().cloned().collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn reregistering_replaces_entry() {
        let manifest = Manifest::new()
            .command("greet", CommandSpec::new().summary("old"))
            .command("greet", CommandSpec::new().summary("new"));

        let spec = manifest.get("greet").unwrap();
        assert_eq!(spec.summary.as_deref(), Some("new"));
    }
}
