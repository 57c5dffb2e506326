//! Presentation layer with the chat command surface.

/// Chat command parsing and replies.
pub mod commands;

pub use commands::{ChatCommand, CommandDispatcher, Reply};
