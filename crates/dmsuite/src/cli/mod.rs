//! Command-line interface for dmsuite.
//!
//! This module provides the CLI structure for the `dmsitem` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ImportCommand, InspectCommand, NewCommand, NormalizeCommand, OutputFormat,
};

/// dmsitem - Work with Data Management Suite catalog items
///
/// Reads, normalizes and creates STAC items that carry the Data Management
/// Suite descriptive fields.
#[derive(Debug, Parser)]
#[command(name = "dmsitem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the descriptive fields and collection of an item
    Inspect(InspectCommand),

    /// Read an item and print its canonical JSON form
    Normalize(NormalizeCommand),

    /// Create a new item and print it as JSON
    New(NewCommand),

    /// Convert a GeoNetwork metadata record into a STAC item
    Import(ImportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "dmsitem");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["dmsitem", "-q", "config", "path"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["dmsitem", "config", "path"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["dmsitem", "-v", "config", "path"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["dmsitem", "-vv", "config", "path"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_inspect() {
        let cli = parse(&["dmsitem", "inspect", "item.json", "--format", "json"]);
        match cli.command {
            Command::Inspect(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("item.json"));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_normalize_with_migrate() {
        let cli = parse(&["dmsitem", "normalize", "old.json", "--migrate"]);
        assert!(matches!(cli.command, Command::Normalize(NormalizeCommand { migrate: true, .. })));
    }

    #[test]
    fn test_parse_new() {
        let cli = parse(&[
            "dmsitem",
            "new",
            "--title",
            "Harbour survey",
            "--project-number",
            "11209233-002",
            "--location",
            "Rotterdam",
            "--geo-box",
            "4.0|51.9|4.2|52.0",
            "--datetime",
            "2024-05-01",
        ]);
        match cli.command {
            Command::New(cmd) => {
                assert_eq!(cmd.title, "Harbour survey");
                assert_eq!(cmd.description, "");
                assert_eq!(cmd.id, "");
                assert!(cmd.license.is_none());
                assert_eq!(cmd.geo_box.as_deref(), Some("4.0|51.9|4.2|52.0"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_new_requires_title() {
        let result = Cli::try_parse_from([
            "dmsitem",
            "new",
            "--project-number",
            "1",
            "--location",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_import() {
        let cli = parse(&[
            "dmsitem",
            "import",
            "record.json",
            "--base-url",
            "https://dms.example.com/api",
        ]);
        match cli.command {
            Command::Import(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("record.json"));
                assert_eq!(cmd.base_url, "https://dms.example.com/api");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_import_requires_base_url() {
        assert!(Cli::try_parse_from(["dmsitem", "import", "record.json"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["dmsitem", "-c", "/custom/config.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
