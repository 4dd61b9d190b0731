//! # rf-config
//!
//! Typed settings for the Rusty-Forum binary.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `rusty-forum.toml` next to the binary, then `RF__SECTION__KEY`
//! environment variables (a `.env` file is loaded into the environment
//! first).

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use rf_core::ServiceOptions;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "rusty-forum";
pub const ENV_PREFIX: &str = "RF";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub forum: ForumSettings,
    pub log: LogSettings,
    /// The `.env` file that was loaded, if any. Logged by the caller once
    /// tracing is up.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForumSettings {
    /// Load/mutate/persist attempts per mutation before `Conflict` surfaces.
    pub max_write_attempts: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    pub filter: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();
        let config = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?;
        Ok(Self { env_file, ..Self::finish(config)? })
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = defaults()?.add_source(File::from_str(toml, FileFormat::Toml)).build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let forum = &self.forum;
        if forum.max_write_attempts == 0 {
            return Err(ConfigError::Invalid("forum.max_write_attempts must be at least 1".into()));
        }
        if forum.default_page_size == 0 {
            return Err(ConfigError::Invalid("forum.default_page_size must be at least 1".into()));
        }
        if forum.default_page_size > forum.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "forum.default_page_size ({}) exceeds forum.max_page_size ({})",
                forum.default_page_size, forum.max_page_size
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            max_write_attempts: self.forum.max_write_attempts,
            default_page_size: self.forum.default_page_size,
            max_page_size: self.forum.max_page_size,
        }
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite:rusty_forum.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("forum.max_write_attempts", 3)?
        .set_default("forum.default_page_size", 20)?
        .set_default("forum.max_page_size", 100)?
        .set_default("log.filter", "rusty_forum=info,rf_core=info,actix_web=info")?
        .set_default("log.json", false)?)
}
