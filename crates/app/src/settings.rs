//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then from
//! `KARADMIN__<SECTION>__<KEY>` environment variables.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    /// Directory holding one subdirectory per bucket.
    pub root: String,
    /// Base of public attachment URLs; defaults to the server address.
    pub public_base_url: Option<String>,
    #[serde(default = "best_effort_cleanup")]
    pub best_effort_cleanup: bool,
}

fn best_effort_cleanup() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub storage: Option<Storage>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("KARADMIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
