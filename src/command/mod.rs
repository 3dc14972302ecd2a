//! Inbound chat commands.
//!
//! [`ChatCommand::parse`] turns message text into a typed command, and
//! [`ChatCommandService`] runs it against the task lifecycle and answers
//! the sender through the notifier.

mod parser;
mod service;

pub use parser::ChatCommand;
pub use service::{ChatCommandService, CommandOutcome};

#[cfg(test)]
mod tests;
