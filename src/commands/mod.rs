//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod interactive;
mod list;
mod summary;

use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use interactive::interactive;
pub use list::list;
pub use summary::{summary, SummaryReport};

/// The output type for a command. This allows each command to return a consistent message for
/// people and, optionally, structured data for scripts.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if !self.message.is_empty() {
            println!("{}", self.message.trim_end());
        }
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }

    /// Print the structured data as JSON to stdout, falling back to the message when there is
    /// none.
    pub fn print_json(&self) -> crate::Result<()> {
        match self.structure() {
            Some(structure) => println!("{}", serde_json::to_string_pretty(structure)?),
            None => println!("{}", self.message.trim_end()),
        }
        Ok(())
    }
}
