//! Configuration management for dmsuite.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::stac::FromDictOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the user config dir.
const CONFIG_DIR_NAME: &str = "dmsuite";

/// Prefix of configuration environment variables.
const ENV_PREFIX: &str = "DMSUITE_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DMSUITE_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/dmsuite/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Item defaults.
    pub item: ItemConfig,
    /// Link generation.
    pub links: LinkConfig,
}

/// Defaults applied when creating or reading items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    /// License used when none is given on the command line.
    pub default_license: Option<String>,
    /// Upgrade older item documents while reading them.
    pub migrate: bool,
}

/// Settings for links written into new items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Base URL of the collections endpoint, e.g.
    /// `https://dms.example.com/api/collections`.
    pub collections_base_url: Option<String>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails, or if the
    /// result does not validate.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(license) = &self.item.default_license {
            if license.trim().is_empty() {
                return Err(Error::config_validation(
                    "item.default_license must not be empty",
                ));
            }
        }

        if let Some(base) = &self.links.collections_base_url {
            let url = Url::parse(base).map_err(|e| {
                Error::config_validation(format!(
                    "links.collections_base_url '{base}' is not a valid URL: {e}"
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::config_validation(format!(
                    "links.collections_base_url must use http or https, got '{}'",
                    url.scheme()
                )));
            }
        }

        Ok(())
    }

    /// The target of a `collection` link for the given collection.
    ///
    /// `None` when no collections base URL is configured.
    #[must_use]
    pub fn collection_href(&self, collection_id: &str) -> Option<String> {
        self.links
            .collections_base_url
            .as_deref()
            .map(|base| format!("{}/{collection_id}", base.trim_end_matches('/')))
    }

    /// Read options matching this configuration.
    #[must_use]
    pub fn from_dict_options(&self) -> FromDictOptions {
        FromDictOptions::default().with_migrate(self.item.migrate)
    }
}
