//! Command-line arguments.

use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Global options and the cache operation to run.
#[derive(Debug, Parser)]
#[command(
    name = "curator",
    version,
    about = "Numbered media cache harvested from a Discord channel",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Directory holding the cache files.
    #[arg(long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Channel to harvest media from.
    #[arg(long)]
    pub channel_id: Option<u64>,

    /// Stop a build after this many items.
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Discord bot token.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Build the cache if no cache file exists yet.
    Init,
    /// Rebuild the cache from the full channel history.
    Build,
    /// Print a random cached item.
    Random,
    /// Print the item with the given ID.
    Get {
        /// Item ID.
        id: u32,
    },
    /// Mark an item as deleted.
    Delete {
        /// Item ID.
        id: u32,
    },
    /// Append the media of one message to the cache.
    Append {
        /// Message snowflake.
        message_id: u64,
    },
    /// Show cache counters.
    Status,
    /// Handle a chat command line such as `!media 3`.
    Dispatch {
        /// Raw message text.
        text: String,
    },
}
