//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Voting window configuration.
    #[serde(default)]
    pub voting: VotingConfig,
    /// Weekly chart configuration.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Voting window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Hours after air time during which anyone may vote.
    #[serde(default = "default_open_window_hours")]
    pub open_window_hours: i64,
    /// Days after air time during which members may still cast late votes.
    #[serde(default = "default_late_window_days")]
    pub late_window_days: i64,
    /// Salt mixed into network identifiers before hashing.
    #[serde(default)]
    pub network_hash_salt: String,
}

/// Weekly chart configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Hours after a period ends before its chart is closed.
    #[serde(default = "default_close_grace_hours")]
    pub close_grace_hours: i64,
    /// Ranks at or above this cutoff count towards `weeks_on_top`.
    #[serde(default = "default_top_n")]
    pub top_n: u32,
    /// Seconds between scheduler checks for due periods.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            open_window_hours: default_open_window_hours(),
            late_window_days: default_late_window_days(),
            network_hash_salt: String::new(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            close_grace_hours: default_close_grace_hours(),
            top_n: default_top_n(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_open_window_hours() -> i64 {
    36
}

const fn default_late_window_days() -> i64 {
    7
}

const fn default_close_grace_hours() -> i64 {
    36
}

const fn default_top_n() -> u32 {
    10
}

const fn default_check_interval_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `ANICHART_ENV`)
    /// 3. Environment variables with `ANICHART_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("ANICHART_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ANICHART")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("ANICHART")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
