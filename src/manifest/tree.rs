//! manifest::tree
//!
//! The parsed command tree and the Command Resolver.
//!
//! # Design
//!
//! Namespaced command names are split on [`super::NAMESPACE_SEPARATOR`]
//! exactly once, at registration time. Each tree node may carry a
//! registered [`CommandSpec`] and any number of children; a node with a
//! spec but no handler is a group header, and a node without a spec is an
//! unregistered intermediate segment.
//!
//! Resolution is strict exact-match: asking for a name that only exists as
//! an intermediate segment yields [`ResolveError::UnknownCommand`]. There
//! is no fuzzy matching and no abbreviation expansion.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use super::{CommandSpec, NAMESPACE_SEPARATOR};

/// Errors from command resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The token matched no registered command name.
    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),
}

/// A command listed under another command (or at the top level) for help
/// purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    /// Full command name, namespace prefix included.
    pub name: String,
    /// Summary from the child's spec; empty when the child is only an
    /// intermediate namespace segment.
    pub summary: String,
}

/// Ephemeral result of resolving a command token.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    /// Canonical command name (the token, trailing separator stripped).
    pub name: String,
    /// The matched entry.
    pub spec: Arc<CommandSpec>,
    /// Immediate children sharing this command's namespace prefix, in
    /// registration order.
    pub children: Vec<ChildEntry>,
}

impl ResolvedCommand {
    /// Is the matched entry executable?
    pub fn is_executable(&self) -> bool {
        self.spec.is_executable()
    }
}

#[derive(Debug, Default)]
struct Node {
    spec: Option<Arc<CommandSpec>>,
    children: IndexMap<String, Node>,
}

/// The command tree, built once at configuration time.
#[derive(Debug, Default)]
pub struct CommandTree {
    roots: IndexMap<String, Node>,
}

impl CommandTree {
    /// Insert a spec under a possibly-namespaced name, creating
    /// intermediate nodes as needed.
    pub fn insert(&mut self, name: &str, spec: Arc<CommandSpec>) {
        let mut segments = name.split(NAMESPACE_SEPARATOR);
        let first = segments.next().unwrap_or_default();
        let mut node = self.roots.entry(first.to_string()).or_default();
        for segment in segments {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.spec = Some(spec);
    }

    /// Resolve a token to its registered entry and immediate children.
    pub fn resolve(&self, token: &str) -> Result<ResolvedCommand, ResolveError> {
        let node = self
            .walk(token)
            .ok_or_else(|| ResolveError::UnknownCommand(token.to_string()))?;
        let spec = node
            .spec
            .clone()
            .ok_or_else(|| ResolveError::UnknownCommand(token.to_string()))?;
        Ok(ResolvedCommand {
            name: token.to_string(),
            spec,
            children: Self::children_of(token, node),
        })
    }

    /// All registered top-level commands, in registration order.
    ///
    /// Implicit roots (created only by inserting a namespaced descendant,
    /// never registered themselves) are not listed.
    pub fn top_level(&self) -> Vec<ChildEntry> {
        self.roots
            .iter()
            .filter_map(|(name, node)| {
                node.spec.as_ref().map(|spec| ChildEntry {
                    name: name.clone(),
                    summary: spec.summary.clone().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Is the tree empty?
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn walk(&self, token: &str) -> Option<&Node> {
        let mut segments = token.split(NAMESPACE_SEPARATOR);
        let mut node = self.roots.get(segments.next()?)?;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    fn children_of(prefix: &str, node: &Node) -> Vec<ChildEntry> {
        node.children
            .iter()
            .map(|(name, child)| ChildEntry {
                name: format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, name),
                summary: child
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.summary.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
