//! Curator - A numbered media cache harvested from a Discord channel.
//!
//! This crate scans a channel's message history for media URLs, verifies
//! them, and keeps a deduplicated, sequentially numbered cache with soft
//! deletion, laid out in clean-architecture layers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the chat command surface.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "curator";
