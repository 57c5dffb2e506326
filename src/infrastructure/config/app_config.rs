//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::infrastructure::discord::DISCORD_API_BASE;

pub(crate) const APP_NAME: &str = "curator";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to the tracing level used as the default filter.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Bot token. Never written to the config file.
    #[serde(skip)]
    pub token: Option<String>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory holding the cache and exclusion files.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Message source settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Build settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chat command triggers.
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// Message source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Channel whose history is harvested.
    #[serde(default)]
    pub channel_id: Option<u64>,

    /// REST endpoint.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Messages requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u8,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
        }
    }
}

/// Cache build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Stop a build after this many accepted URLs.
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Per-URL verification timeout in seconds.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,
}

impl CacheConfig {
    /// Returns the verification timeout.
    #[must_use]
    pub const fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: None,
            verify_timeout_secs: default_verify_timeout_secs(),
        }
    }
}

/// Chat command triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Posts a random item, or one by ID when followed by a number.
    #[serde(default = "default_random_trigger")]
    pub random: String,
    /// Soft-deletes an item by ID.
    #[serde(default = "default_delete_trigger")]
    pub delete: String,
    /// Rebuilds the cache from the channel history.
    #[serde(default = "default_rebuild_trigger")]
    pub rebuild: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            random: default_random_trigger(),
            delete: default_delete_trigger(),
            rebuild: default_rebuild_trigger(),
        }
    }
}

fn default_api_base_url() -> String {
    DISCORD_API_BASE.to_string()
}

const fn default_page_size() -> u8 {
    100
}

const fn default_verify_timeout_secs() -> u64 {
    10
}

fn default_random_trigger() -> String {
    "!media".to_string()
}

fn default_delete_trigger() -> String {
    "!mediadelete".to_string()
}

fn default_rebuild_trigger() -> String {
    "!mediarebuild".to_string()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(storage_dir) = &args.storage_dir {
            self.storage_dir = Some(storage_dir.clone());
        }
        if let Some(channel_id) = args.channel_id {
            self.discord.channel_id = Some(channel_id);
        }
        if let Some(max_items) = args.max_items {
            self.cache.max_items = Some(max_items);
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default storage directory.
    #[must_use]
    pub fn default_storage_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Returns effective storage directory, falling back to the working directory.
    #[must_use]
    pub fn effective_storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .or_else(Self::default_storage_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            token: None,
            log_path: None,
            log_level: LogLevel::Info,
            storage_dir: None,
            discord: DiscordConfig::default(),
            cache: CacheConfig::default(),
            commands: CommandsConfig::default(),
        }
    }
}
