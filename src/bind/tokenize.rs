//! bind::tokenize
//!
//! Low-level flag tokenizer.
//!
//! # Design
//!
//! The tokenizer knows nothing about commands. It receives the raw argument
//! vector and an [`AliasTable`] mapping flag aliases to "expects a value"
//! vs "bare presence", and splits the input into matched option values and
//! the ordered positional remainder.
//!
//! Rules:
//!
//! - a flag token is matched by stripping leading dashes, so `-v`, `--v`,
//!   `-verbose`, and `--verbose` all probe the same table
//! - a value-taking option accepts `--name=value` inline or consumes the
//!   next token; at end of input with no value it binds nothing
//! - repeated occurrences of the same option: last one wins
//! - tokens matching no declared alias (flag-shaped or not) fall through
//!   to the positional remainder in order

use std::collections::HashMap;

/// One declared option: its aliases and whether it consumes a value.
#[derive(Debug, Clone)]
pub struct AliasSpec {
    /// Aliases without dashes, e.g. `["n", "name"]`.
    pub aliases: Vec<String>,
    /// Does a match consume a value token?
    pub takes_value: bool,
}

/// Table of declared flag aliases for one command.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasSpec>,
}

impl AliasTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one option's aliases.
    pub fn declare<S: AsRef<str>>(&mut self, aliases: &[S], takes_value: bool) {
        self.entries.push(AliasSpec {
            aliases: aliases.iter().map(|a| a.as_ref().to_string()).collect(),
            takes_value,
        });
    }

    fn lookup(&self, alias: &str) -> Option<&AliasSpec> {
        self.entries
            .iter()
            .find(|entry| entry.aliases.iter().any(|a| a == alias))
    }
}

/// An option value produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptToken {
    /// Boolean flag was present.
    Present,
    /// Value-taking flag with its value.
    Value(String),
}

/// Tokenizer output: matched options keyed by each declared alias, plus the
/// ordered positional remainder.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    /// Matched option values, probeable by any alias of the matched entry.
    pub options: HashMap<String, OptToken>,
    /// Tokens not consumed as flags or flag values, in input order.
    pub positionals: Vec<String>,
}

/// Is this token flag-shaped?
fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token != "--"
}

/// Split the raw argument vector against a table of declared aliases.
pub fn tokenize(argv: &[String], table: &AliasTable) -> Tokenized {
    let mut result = Tokenized::default();
    let mut iter = argv.iter().peekable();

    while let Some(token) = iter.next() {
        if !is_flag(token) {
            result.positionals.push(token.clone());
            continue;
        }

        let stripped = token.trim_start_matches('-');
        let (name, inline) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (stripped, None),
        };

        let Some(entry) = table.lookup(name) else {
            // Undeclared flag: falls through as a positional.
            result.positionals.push(token.clone());
            continue;
        };

        let value = if !entry.takes_value {
            Some(OptToken::Present)
        } else if let Some(inline) = inline {
            Some(OptToken::Value(inline.to_string()))
        } else if let Some(next) = iter.peek() {
            if is_flag(next.as_str()) {
                None
            } else {
                Some(OptToken::Value(iter.next().cloned().unwrap_or_default()))
            }
        } else {
            None
        };

        if let Some(value) = value {
            for alias in &entry.aliases {
                result.options.insert(alias.clone(), value.clone());
            }
        }
    }

    result
}
