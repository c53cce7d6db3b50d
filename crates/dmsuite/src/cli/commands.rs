//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Inspect command arguments.
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Item JSON file to read
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Normalize command arguments.
#[derive(Debug, Args)]
pub struct NormalizeCommand {
    /// Item JSON file to read
    pub file: PathBuf,

    /// Upgrade older STAC documents while reading
    #[arg(short, long)]
    pub migrate: bool,

    /// Record the file location as the item's self link
    #[arg(long)]
    pub self_link: bool,
}

/// New command arguments.
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Item title
    #[arg(long)]
    pub title: String,

    /// Project number
    #[arg(long)]
    pub project_number: String,

    /// Location the item covers
    #[arg(long)]
    pub location: String,

    /// Description
    #[arg(long, default_value = "")]
    pub description: String,

    /// License identifier (falls back to item.default_license)
    #[arg(long)]
    pub license: Option<String>,

    /// Collection the item belongs to
    #[arg(long)]
    pub collection: Option<String>,

    /// Item identifier, usually left empty for the registry to assign
    #[arg(long, default_value = "")]
    pub id: String,

    /// Footprint as "min_x|min_y|max_x|max_y"
    #[arg(long, value_name = "BOX")]
    pub geo_box: Option<String>,

    /// Acquisition time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub datetime: Option<String>,

    /// Start of the covered range
    #[arg(long)]
    pub start: Option<String>,

    /// End of the covered range
    #[arg(long)]
    pub end: Option<String>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// GeoNetwork record JSON file to read
    pub file: PathBuf,

    /// Base URL the item's self link is placed under
    #[arg(long, value_name = "URL")]
    pub base_url: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
