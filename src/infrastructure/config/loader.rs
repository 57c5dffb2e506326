//! Locating, reading and sanitizing the config file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::app_config::{AppConfig, CacheConfig, CommandsConfig};
use crate::domain::ports::MAX_PAGE_SIZE;

const DEFAULT_HEADER: &str = "\
# curator configuration
# The bot token is read from DISCORD_BOT_TOKEN and never stored here.

";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,

    #[error("command trigger {trigger:?} is used by more than one command")]
    DuplicateTrigger { trigger: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Reads the config file at one resolved path.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Uses `path_override` when given, the per-user config file otherwise.
    ///
    /// # Errors
    /// Returns `ConfigDirNotFound` when there is no override and no home directory.
    pub fn resolve(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_config_path().ok_or(ConfigError::ConfigDirNotFound)?,
        };
        Ok(Self { path })
    }

    /// Creates a loader for an explicit file.
    #[must_use]
    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file this loader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and sanitizes the configuration.
    ///
    /// A missing file is created with defaults. A file that fails to parse
    /// is left untouched and defaults are used.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, the default cannot be
    /// written, or two commands share a trigger.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match fs::read_to_string(&self.path) {
            Ok(content) => toml::from_str::<AppConfig>(&content).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "Failed to parse config file, using defaults");
                AppConfig::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Config file not found, writing defaults");
                let config = AppConfig::default();
                self.write_default(&config)?;
                config
            }
            Err(e) => return Err(e.into()),
        };

        sanitize(&mut config)?;
        config.config = Some(self.path.clone());
        Ok(config)
    }

    fn write_default(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let body = toml::to_string_pretty(config)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(DEFAULT_HEADER.as_bytes())?;
        file.write_all(body.as_bytes())?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Pulls out-of-range values back to something usable and rejects
/// trigger sets the chat surface cannot tell apart.
fn sanitize(config: &mut AppConfig) -> Result<(), ConfigError> {
    let page_size = config.discord.page_size.clamp(1, MAX_PAGE_SIZE);
    if page_size != config.discord.page_size {
        warn!(
            configured = config.discord.page_size,
            used = page_size,
            "discord.page_size must be between 1 and {MAX_PAGE_SIZE}"
        );
        config.discord.page_size = page_size;
    }

    if config.cache.verify_timeout_secs == 0 {
        let fallback = CacheConfig::default().verify_timeout_secs;
        warn!(used = fallback, "cache.verify_timeout_secs must be positive");
        config.cache.verify_timeout_secs = fallback;
    }

    let defaults = CommandsConfig::default();
    let commands = &mut config.commands;
    for (trigger, default) in [
        (&mut commands.random, defaults.random),
        (&mut commands.delete, defaults.delete),
        (&mut commands.rebuild, defaults.rebuild),
    ] {
        if trigger.is_empty() || trigger.contains(char::is_whitespace) {
            warn!(configured = %trigger, used = %default, "Command trigger must be a single word");
            *trigger = default;
        }
    }

    let random = commands.random.to_lowercase();
    let delete = commands.delete.to_lowercase();
    let rebuild = commands.rebuild.to_lowercase();
    if random == delete || random == rebuild {
        return Err(ConfigError::DuplicateTrigger { trigger: random });
    }
    if delete == rebuild {
        return Err(ConfigError::DuplicateTrigger { trigger: delete });
    }

    Ok(())
}
