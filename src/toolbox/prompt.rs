//! toolbox::prompt
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are behind the [`Prompt`] trait so embedders and tests can
//! substitute a scripted implementation at configuration time. The default
//! [`StdinPrompt`] writes prompt text to stderr (keeping stdout clean for
//! command output) and refuses to prompt when stdin is not a terminal.

use std::io::{BufRead, IsTerminal, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    Io(String),
}

/// Prompt facility injected into the toolbox.
pub trait Prompt: Send + Sync {
    /// Prompt for a line of text.
    fn input(&self, message: &str) -> Result<String, PromptError>;

    /// Prompt for confirmation (yes/no). An empty answer takes `default`.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Prompt to select from a list; returns the chosen index.
    fn select(&self, message: &str, options: &[String]) -> Result<usize, PromptError>;

    /// Prompt for masked input (passwords, tokens).
    fn password(&self, message: &str) -> Result<String, PromptError>;
}

/// Terminal-backed prompt implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    fn read_line(&self) -> Result<String, PromptError> {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| PromptError::Io(err.to_string()))?;
        if line.is_empty() {
            // EOF before any input.
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&self, message: &str) -> Result<(), PromptError> {
        if !std::io::stdin().is_terminal() {
            return Err(PromptError::NotInteractive);
        }
        let mut err = std::io::stderr();
        write!(err, "{} ", message).map_err(|e| PromptError::Io(e.to_string()))?;
        err.flush().map_err(|e| PromptError::Io(e.to_string()))
    }
}

impl Prompt for StdinPrompt {
    fn input(&self, message: &str) -> Result<String, PromptError> {
        self.show(message)?;
        self.read_line()
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        self.show(&format!("{} {}", message, hint))?;
        let answer = self.read_line()?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err(PromptError::Cancelled),
        }
    }

    fn select(&self, message: &str, options: &[String]) -> Result<usize, PromptError> {
        if options.is_empty() {
            return Err(PromptError::Cancelled);
        }
        let mut listing = String::new();
        for (index, option) in options.iter().enumerate() {
            listing.push_str(&format!("  {}) {}\n", index + 1, option));
        }
        self.show(&format!("{}\n{}choice:", message, listing))?;
        let answer = self.read_line()?;
        let choice: usize = answer.trim().parse().map_err(|_| PromptError::Cancelled)?;
        if choice == 0 || choice > options.len() {
            return Err(PromptError::Cancelled);
        }
        Ok(choice - 1)
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        if !std::io::stdin().is_terminal() {
            return Err(PromptError::NotInteractive);
        }
        rpassword::prompt_password(format!("{} ", message))
            .map_err(|err| PromptError::Io(err.to_string()))
    }
}
