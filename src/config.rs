//! Configuration management for the bookshelf server
use std::env;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

/// Config file read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "bookshelf.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    /// Directory served under `/public`.
    pub public_dir: String,
    /// Seed a few authors into an empty database at startup.
    pub demo_mode: bool,
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file and environment variables
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Self::defaults()?
            .add_source(file)
            // Environment variables with prefix BOOKSHELF_, nested keys split on "__"
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("mongodb.uri", env::var("MONGODB_URI").ok())?
            .set_override_option("mongodb.database", env::var("MONGODB_DATABASE").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Built-in values every other source is layered on.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("mongodb.uri", "mongodb://localhost:27017")?
            .set_default("mongodb.database", "bookshelf")?
            .set_default("public_dir", "public")?
            .set_default("demo_mode", false)
    }

    /// Parse settings from an inline TOML document on top of the defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
