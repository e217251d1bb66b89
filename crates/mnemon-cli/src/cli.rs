//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mnemon - durable key/value memory with automated upkeep.
#[derive(Debug, Parser)]
#[command(name = "mnemon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the configured path)
    #[arg(short, long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a value under a key
    Store(StoreArgs),

    /// Recall the newest value stored under a key
    Recall(RecallArgs),

    /// Fetch a single item by id
    Get(GetArgs),

    /// List all stored items, oldest first
    List,

    /// Remove an item by id or by key
    Remove(RemoveArgs),

    /// Delete every stored item
    Clear(ClearArgs),

    /// Count stored items
    Count,

    /// Show memory metrics and health status
    Stats(StatsArgs),

    /// Remove items older than the configured age limit
    Prune,

    /// Remove older duplicates of identical key/value pairs
    Deduplicate,

    /// Run a full maintenance cycle (prune, deduplicate, enforce capacity)
    Maintenance,

    /// Run the store with background maintenance and health monitoring
    Serve,
}

/// Arguments for the store command.
#[derive(Debug, Parser)]
pub struct StoreArgs {
    /// Key to store the value under
    pub key: String,

    /// Value to store
    pub value: String,

    /// Metadata entry in key=value form (repeatable)
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

/// Arguments for the recall command.
#[derive(Debug, Parser)]
pub struct RecallArgs {
    /// Key to recall
    pub key: String,
}

/// Arguments for the get command.
#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Item id
    pub id: String,
}

/// Arguments for the remove command.
#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Item id to remove
    #[arg(long, conflicts_with = "key")]
    pub id: Option<String>,

    /// Remove one item stored under this key
    #[arg(long)]
    pub key: Option<String>,
}

/// Arguments for the clear command.
#[derive(Debug, Parser)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the stats command.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Show the full metrics report
    #[arg(short, long)]
    pub detailed: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
