//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Discord API client.
pub mod discord;
/// HTTP URL verification.
pub mod http;
/// JSON file persistence.
pub mod store;

pub use config::{AppConfig, CliArgs, Command, ConfigLoader, LogLevel};
pub use discord::DiscordClient;
pub use http::HttpUrlVerifier;
pub use store::JsonCacheStore;
