//! `dmsitem` - CLI for dmsuite
//!
//! This binary reads, normalizes and creates Data Management Suite catalog
//! items, and imports GeoNetwork records as STAC items.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing::info;

use dmsuite::cli::{
    Cli, Command, ConfigCommand, ImportCommand, InspectCommand, NewCommand, NormalizeCommand,
    OutputFormat,
};
use dmsuite::stac::{Geometry, ItemParams, Link};
use dmsuite::temporal::{parse_datetime, Temporal};
use dmsuite::{init_logging, Config, DescriptiveFields, DmsItem, GeonetworkRecord, Item};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Inspect(cmd) => handle_inspect(&config, &cmd),
        Command::Normalize(cmd) => handle_normalize(&config, &cmd),
        Command::New(cmd) => handle_new(&config, cmd),
        Command::Import(cmd) => handle_import(&cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn handle_inspect(config: &Config, cmd: &InspectCommand) -> Result<()> {
    let value = read_json(&cmd.file)?;
    let item = DmsItem::from_value(value, config.from_dict_options())
        .with_context(|| format!("reading item from {}", cmd.file.display()))?;
    let temporal = item.item().temporal().map(|t| t.to_string());

    match cmd.format {
        OutputFormat::Json => {
            let summary = json!({
                "id": item.id(),
                "title": item.title(),
                "projectNumber": item.project_number(),
                "description": item.description(),
                "location": item.location(),
                "license": item.license(),
                "collectionId": item.collection_id(),
                "temporal": temporal,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Plain => {
            let id = if item.has_id() { item.id() } else { "(unassigned)" };
            println!("ID:             {id}");
            println!("Title:          {}", item.title());
            println!("Project number: {}", item.project_number());
            println!("Location:       {}", item.location());
            println!("License:        {}", item.license().unwrap_or("-"));
            println!("Collection:     {}", item.collection_id().unwrap_or("-"));
            println!("Time:           {}", temporal.as_deref().unwrap_or("-"));
            if !item.description().is_empty() {
                println!();
                println!("{}", item.description());
            }
        }
    }
    Ok(())
}

fn handle_normalize(config: &Config, cmd: &NormalizeCommand) -> Result<()> {
    let mut options = config.from_dict_options();
    if cmd.migrate {
        options = options.with_migrate(true);
    }
    if cmd.self_link {
        let path = std::fs::canonicalize(&cmd.file)
            .with_context(|| format!("resolving {}", cmd.file.display()))?;
        options = options.with_href(path.to_string_lossy());
    }

    let value = read_json(&cmd.file)?;
    let item = DmsItem::from_value(value, options)
        .with_context(|| format!("reading item from {}", cmd.file.display()))?;

    println!("{}", serde_json::to_string_pretty(&item.to_value()?)?);
    Ok(())
}

fn handle_new(config: &Config, cmd: NewCommand) -> Result<()> {
    let parse = |flag: &str, value: Option<&str>| {
        value
            .map(parse_datetime)
            .transpose()
            .with_context(|| format!("invalid --{flag}"))
    };
    let temporal = Temporal::normalize(
        parse("datetime", cmd.datetime.as_deref())?,
        parse("start", cmd.start.as_deref())?,
        parse("end", cmd.end.as_deref())?,
    )
    .context("either --datetime or --start and --end is required")?;

    let mut params = ItemParams {
        id: cmd.id,
        collection: cmd.collection,
        ..ItemParams::default()
    }
    .with_temporal(temporal);
    if let Some(geo_box) = &cmd.geo_box {
        params = params.with_geometry(Geometry::from_geo_box(geo_box)?);
    }

    let mut fields = DescriptiveFields::new(cmd.title, cmd.project_number, cmd.location)
        .with_description(cmd.description);
    if let Some(license) = cmd.license.or_else(|| config.item.default_license.clone()) {
        fields = fields.with_license(license);
    }

    let mut item = DmsItem::new(fields, params)?;
    if let Some(href) = item.collection_id().and_then(|id| config.collection_href(id)) {
        item.add_link(Link::collection(href));
    }

    info!(title = item.title(), collection = ?item.collection_id(), "created item");
    println!("{}", serde_json::to_string_pretty(&item.to_value()?)?);
    Ok(())
}

fn handle_import(cmd: &ImportCommand) -> Result<()> {
    let record = GeonetworkRecord::from_value(read_json(&cmd.file)?)
        .with_context(|| format!("reading GeoNetwork record from {}", cmd.file.display()))?;
    let item = Item::from_geonetwork(&record, &cmd.base_url)
        .with_context(|| format!("converting GeoNetwork record '{}'", record.identifier))?;

    info!(id = %item.id, "imported GeoNetwork record");
    println!("{}", serde_json::to_string_pretty(&item.to_value()?)?);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Item]");
                println!(
                    "  Default license:      {}",
                    config.item.default_license.as_deref().unwrap_or("(none)")
                );
                println!("  Migrate on read:      {}", config.item.migrate);
                println!();
                println!("[Links]");
                println!(
                    "  Collections base URL: {}",
                    config
                        .links
                        .collections_base_url
                        .as_deref()
                        .unwrap_or("(none)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("configuration {} is invalid", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
