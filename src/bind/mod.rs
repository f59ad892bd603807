//! bind
//!
//! The Option/Argument Binder: converts tokenizer output into a validated,
//! typed parameter bag using the matched command's specs.
//!
//! # Architecture
//!
//! Binding is a pure transform with four steps:
//!
//! 1. build a flag-alias table from the command's option specs
//! 2. run the [`tokenize`] tokenizer over the full raw argument vector
//! 3. probe the result by each option's short and long alias, enforcing
//!    `required`
//! 4. consume the positional remainder in declaration order (the first
//!    positional is the command token itself and is skipped), enforcing
//!    `optional` and running validators on present values
//!
//! The output merges bound options and then bound positionals into one
//! flat [`Params`] bag. A positional whose name collides with an option
//! name overwrites the option's value - documented last-write-wins, an
//! authoring situation to avoid in the manifest rather than one the
//! engine rejects.
//!
//! # Invariants
//!
//! - No side effects: binding never touches the toolbox or the sink.
//! - Validators run only when a value is present.
//! - A required option missing after step 3 is a hard error before the
//!   handler runs.

pub mod tokenize;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::manifest::CommandSpec;

pub use tokenize::{tokenize, AliasTable, OptToken, Tokenized};

/// Errors from binding.
#[derive(Debug, Error)]
pub enum BindError {
    /// A required option was absent by both aliases. Carries the canonical
    /// `-s name, --long=name` form.
    #[error("Missing required option \"{0}\"")]
    MissingOption(String),

    /// A required positional parameter had no corresponding token.
    #[error("Missing required parameter \"{0}\"")]
    MissingParameter(String),

    /// A parameter's validator rejected its value; the validator's own
    /// message surfaces as-is.
    #[error("{source}")]
    Validation {
        /// Parameter name, for programmatic inspection.
        name: String,
        source: anyhow::Error,
    },
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean flag that was present.
    Flag(bool),
    /// A string option value or positional token.
    Text(String),
}

impl Value {
    /// The text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Flag(_) => None,
        }
    }
}

/// The flat, validated parameter bag passed to handlers and hooks.
///
/// Keys are option and positional-parameter names from the manifest;
/// insertion order follows binding order (options first, then positionals).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params {
    values: IndexMap<String, Value>,
}

impl Params {
    /// Look up a bound value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Text value of a bound parameter, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Was a boolean flag (or any value) bound under `name`?
    pub fn flag(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is the bag empty?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bound parameters in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }
}

/// Bind the raw argument vector against a command's specs.
///
/// `argv` is the full vector including the command token at index 0.
pub fn bind(spec: &CommandSpec, argv: &[String]) -> Result<Params, BindError> {
    // Step 1: alias table from the option specs.
    let mut table = AliasTable::new();
    for option in &spec.options {
        let aliases: Vec<&str> = option
            .short
            .as_deref()
            .into_iter()
            .chain(option.long.as_deref())
            .collect();
        table.declare(&aliases, option.kind.takes_value());
    }

    // Step 2: tokenize.
    let tokens = tokenize(argv, &table);

    // Step 3: probe each option by short, then long alias.
    let mut params = Params::default();
    for option in &spec.options {
        let hit = option
            .short
            .as_deref()
            .and_then(|alias| tokens.options.get(alias))
            .or_else(|| {
                option
                    .long
                    .as_deref()
                    .and_then(|alias| tokens.options.get(alias))
            });
        match hit {
            Some(OptToken::Value(value)) => {
                params.insert(&option.name, Value::Text(value.clone()));
            }
            Some(OptToken::Present) => {
                params.insert(&option.name, Value::Flag(true));
            }
            None => {}
        }
        if option.required && params.get(&option.name).is_none() {
            return Err(BindError::MissingOption(option.canonical()));
        }
    }

    // Step 4: positionals in declaration order; index 0 is the command
    // token itself.
    let mut remainder = tokens.positionals.iter().skip(1);
    for (name, arg) in &spec.args {
        match remainder.next() {
            Some(token) => {
                if let Some(validate) = &arg.validate {
                    validate(token).map_err(|source| BindError::Validation {
                        name: name.clone(),
                        source,
                    })?;
                }
                params.insert(name, Value::Text(token.clone()));
            }
            None => {
                if !arg.optional {
                    return Err(BindError::MissingParameter(name.clone()));
                }
            }
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ArgSpec, OptionSpec};

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn greet_spec() -> CommandSpec {
        CommandSpec::new()
            .option(
                OptionSpec::value("greeting")
                    .short("g")
                    .long("greeting")
                    .describe("Greeting to use"),
            )
            .option(OptionSpec::flag("shout").short("s").long("shout"))
            .arg("name", ArgSpec::new().describe("Who to greet"))
            .arg("title", ArgSpec::new().optional())
    }

    #[test]
    fn binds_options_and_positionals() {
        let params = bind(&greet_spec(), &argv(&["greet", "-g", "hello", "Ann"])).unwrap();
        assert_eq!(params.text("greeting"), Some("hello"));
        assert_eq!(params.text("name"), Some("Ann"));
        assert!(!params.flag("shout"));
        assert!(params.get("title").is_none());
    }

    #[test]
    fn command_token_is_skipped() {
        let params = bind(&greet_spec(), &argv(&["greet", "Ann"])).unwrap();
        assert_eq!(params.text("name"), Some("Ann"));
    }

    #[test]
    fn flag_presence_binds_true() {
        let params = bind(&greet_spec(), &argv(&["greet", "--shout", "Ann"])).unwrap();
        assert_eq!(params.get("shout"), Some(&Value::Flag(true)));
    }

    #[test]
    fn missing_required_positional() {
        let err = bind(&greet_spec(), &argv(&["greet"])).unwrap_err();
        assert!(matches!(err, BindError::MissingParameter(name) if name == "name"));
    }

    #[test]
    fn optional_positional_may_be_absent() {
        assert!(bind(&greet_spec(), &argv(&["greet", "Ann"])).is_ok());
        let params = bind(&greet_spec(), &argv(&["greet", "Ann", "Dr"])).unwrap();
        assert_eq!(params.text("title"), Some("Dr"));
    }

    #[test]
    fn missing_required_option_names_canonical_form() {
        let spec = CommandSpec::new().option(
            OptionSpec::value("database")
                .short("d")
                .long("database")
                .required(),
        );
        let err = bind(&spec, &argv(&["migrate"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required option \"-d database, --database=database\""
        );
    }

    #[test]
    fn required_option_satisfied_by_either_alias() {
        let spec = CommandSpec::new().option(
            OptionSpec::value("database")
                .short("d")
                .long("database")
                .required(),
        );
        assert!(bind(&spec, &argv(&["migrate", "-d", "main"])).is_ok());
        assert!(bind(&spec, &argv(&["migrate", "--database=main"])).is_ok());
    }

    #[test]
    fn validator_runs_only_when_value_present() {
        let spec = CommandSpec::new().arg(
            "count",
            ArgSpec::new().optional().validate(|value| {
                value
                    .parse::<u32>()
                    .map(|_| ())
                    .map_err(|_| anyhow::anyhow!("\"{value}\" is not a number"))
            }),
        );

        // Absent: validator must not run.
        assert!(bind(&spec, &argv(&["tally"])).is_ok());

        // Present and valid.
        let params = bind(&spec, &argv(&["tally", "12"])).unwrap();
        assert_eq!(params.text("count"), Some("12"));

        // Present and invalid: validator message surfaces as-is.
        let err = bind(&spec, &argv(&["tally", "twelve"])).unwrap_err();
        assert_eq!(err.to_string(), "\"twelve\" is not a number");
        assert!(matches!(err, BindError::Validation { name, .. } if name == "count"));
    }

    #[test]
    fn positional_name_collision_wins_over_option() {
        // Authoring error per the manifest docs; the engine applies
        // last-write-wins rather than rejecting it.
        let spec = CommandSpec::new()
            .option(OptionSpec::value("name").short("n").long("name"))
            .arg("name", ArgSpec::new());
        let params = bind(&spec, &argv(&["greet", "-n", "Option", "Positional"])).unwrap();
        assert_eq!(params.text("name"), Some("Positional"));
        assert_eq!(params.len(), 1);
    }
}
