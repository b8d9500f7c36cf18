//! Handles settings for the application. Configuration is written in
//! `settings.toml`; any key can be overridden with a `TALLYBOOK__` prefixed
//! environment variable (`TALLYBOOK__APP__LEVEL=debug`).
//!
//! See `settings.toml` for the configuration.
use chrono::Weekday;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./tallybook.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

/// Local calendar used for daily, weekly and monthly limits.
#[derive(Debug, Deserialize)]
pub struct Clock {
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            week_start: default_week_start(),
        }
    }
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub clock: Clock,
}

impl Settings {
    /// Reads `name` (`settings` resolves `settings.toml`); a missing file
    /// falls back to the defaults.
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("TALLYBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
