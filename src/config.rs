//! Configuration management for the ZelHash stratum miner
//!
//! Supports configuration via command line arguments, environment variables,
//! and configuration files (YAML/JSON). Command line values win; the file only
//! fills options left unset.

use crate::stratum::{PoolAddress, SessionConfig, DEFAULT_RECONNECT_DELAY};
use crate::{Error, Result, APP_NAME, APP_VERSION};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default pool password; most pools ignore it
pub const DEFAULT_PASSWORD: &str = "x";

/// Default pace of the simulation worker
pub const DEFAULT_SIMULATION_INTERVAL: Duration = Duration::from_secs(1);

/// Built-in compute workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerType {
    /// No built-in worker; an external engine drives the miner
    #[default]
    None,
    /// Random candidates pushed through verification and submission
    Simulation,
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerType::None => write!(f, "none"),
            WorkerType::Simulation => write!(f, "simulation"),
        }
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Complete configuration for the miner
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "zelhash-miner",
    version = env!("CARGO_PKG_VERSION"),
    about = "ZelHash (Equihash 125,4) stratum mining client",
    long_about = "Connects to a ZelHash stratum pool, keeps job and target state for compute engines, and submits verified shares"
)]
pub struct Config {
    /// Print program info and exit
    #[arg(long)]
    #[serde(skip)]
    pub info: bool,

    /// Print the parsed configuration and exit
    #[arg(long)]
    #[serde(skip)]
    pub print_config: bool,

    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Pool address, `host:port` or `stratum+tcp://host:port`
    #[arg(short = 's', long, env = "ZELHASH_SERVER")]
    #[serde(default)]
    pub server: Option<String>,

    /// Worker name (usually `address.rig`)
    #[arg(short = 'u', long, env = "ZELHASH_USER")]
    #[serde(default)]
    pub user: Option<String>,

    /// Worker password [default: x]
    #[arg(short = 'p', long, env = "ZELHASH_PASS")]
    #[serde(default, skip_serializing)]
    pub pass: Option<String>,

    /// Client identifier sent with mining.subscribe [default: zelhash-miner/<version>]
    #[arg(long)]
    #[serde(default)]
    pub client_id: Option<String>,

    /// Wait between connection attempts, e.g. `5s` [default: 5s]
    #[arg(long, value_name = "DURATION")]
    #[serde(default)]
    pub reconnect_delay: Option<String>,

    /// Log every line exchanged with the pool
    #[arg(short = 'd', long)]
    #[serde(default)]
    pub debug: bool,

    /// Log level [default: info]
    #[arg(short = 'l', long)]
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON
    #[arg(long)]
    #[serde(default)]
    pub log_json: bool,

    /// Built-in worker to run [default: none]
    #[arg(short = 'w', long)]
    #[serde(default)]
    pub worker: Option<WorkerType>,

    /// Interval between simulated candidates [default: 1s]
    #[arg(long, value_name = "DURATION")]
    #[serde(default)]
    pub simulation_interval: Option<String>,
}

impl Config {
    /// Merge the config file, if any, and validate
    pub async fn resolve(mut self) -> Result<Self> {
        if let Some(config_file) = self.config_file.clone() {
            let file_config = Self::load_from_file(&config_file).await?;
            self = self.merge_with_file(file_config);
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Merge CLI config with file config (CLI takes precedence)
    fn merge_with_file(mut self, file_config: Self) -> Self {
        self.server = self.server.or(file_config.server);
        self.user = self.user.or(file_config.user);
        self.pass = self.pass.or(file_config.pass);
        self.client_id = self.client_id.or(file_config.client_id);
        self.reconnect_delay = self.reconnect_delay.or(file_config.reconnect_delay);
        self.log_level = self.log_level.or(file_config.log_level);
        self.worker = self.worker.or(file_config.worker);
        self.simulation_interval = self.simulation_interval.or(file_config.simulation_interval);
        self.debug |= file_config.debug;
        self.log_json |= file_config.log_json;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.pool_address()?;

        if self.user().is_empty() {
            return Err(Error::config("Worker name is required (--user)"));
        }

        if self.reconnect_delay()?.is_zero() {
            return Err(Error::config("Reconnect delay must be greater than 0"));
        }

        if self.simulation_interval()?.is_zero() {
            return Err(Error::config("Simulation interval must be greater than 0"));
        }

        Ok(())
    }

    /// Parsed pool address
    pub fn pool_address(&self) -> Result<PoolAddress> {
        let server = self
            .server
            .as_deref()
            .ok_or_else(|| Error::config("Pool address is required (--server)"))?;
        PoolAddress::parse(server)
    }

    /// Worker name, empty if unset
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }

    /// Worker password
    pub fn pass(&self) -> &str {
        self.pass.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    /// Client identifier for mining.subscribe
    pub fn client_id(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("{}/{}", APP_NAME, APP_VERSION))
    }

    /// Wait between connection attempts
    pub fn reconnect_delay(&self) -> Result<Duration> {
        parse_duration("reconnect delay", self.reconnect_delay.as_deref(), DEFAULT_RECONNECT_DELAY)
    }

    /// Pace of the simulation worker
    pub fn simulation_interval(&self) -> Result<Duration> {
        parse_duration(
            "simulation interval",
            self.simulation_interval.as_deref(),
            DEFAULT_SIMULATION_INTERVAL,
        )
    }

    /// Selected worker
    pub fn worker(&self) -> WorkerType {
        self.worker.unwrap_or_default()
    }

    /// Effective log level; `--debug` raises it to at least debug
    pub fn effective_log_level(&self) -> LogLevel {
        match (self.log_level, self.debug) {
            (Some(LogLevel::Trace), _) => LogLevel::Trace,
            (_, true) => LogLevel::Debug,
            (Some(level), false) => level,
            (None, false) => LogLevel::Info,
        }
    }

    /// Session settings derived from this configuration
    pub fn session_config(&self) -> Result<SessionConfig> {
        let address = self.pool_address()?;
        Ok(SessionConfig {
            user: self.user().to_string(),
            pass: self.pass().to_string(),
            client_id: self.client_id(),
            port: address.port.to_string(),
            reconnect_delay: self.reconnect_delay()?,
        })
    }
}

fn parse_duration(name: &str, value: Option<&str>, default: Duration) -> Result<Duration> {
    match value {
        Some(text) => humantime::parse_duration(text)
            .map_err(|e| Error::config(format!("Invalid {} '{}': {}", name, text, e))),
        None => Ok(default),
    }
}
