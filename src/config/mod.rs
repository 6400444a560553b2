mod file_config;

pub use file_config::{FileConfig, RabbitMqFileConfig};

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Virtual host used when a tool call does not name one.
pub const DEFAULT_VHOST: &str = "/";

pub const DEFAULT_AMQP_PORT: u16 = 5672;
pub const DEFAULT_API_PORT: u16 = 15672;

/// Logging verbosity accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// tracing has no level above ERROR, so CRITICAL collapses onto it.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: u16,
    pub api_port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_AMQP_PORT,
            api_port: DEFAULT_API_PORT,
            username: "guest".to_string(),
            password: "guest".to_string(),
            use_tls: false,
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

/// Connection settings for the broker, shared read-only by every handler.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    pub api_port: u16,
    pub default_vhost: String,
}

impl BrokerConfig {
    /// AMQP connection URI. Credentials are percent-encoded and the vhost
    /// segment always targets the default vhost.
    pub fn amqp_uri(&self) -> String {
        let scheme = if self.use_tls { "amqps" } else { "amqp" };
        format!(
            "{}://{}:{}@{}:{}/{}",
            scheme,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            urlencoding::encode(&self.default_vhost),
        )
    }

    /// Base URL of the HTTP management API.
    pub fn admin_base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}/api", scheme, self.host, self.api_port)
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_tls", &self.use_tls)
            .field("api_port", &self.api_port)
            .field("default_vhost", &self.default_vhost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let rabbitmq = file.rabbitmq.unwrap_or_default();

        let host = rabbitmq
            .host
            .or_else(|| cli.host.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "rabbitmq host must be specified via --rabbitmq-host or in config file"
                )
            })?;
        if host.trim().is_empty() {
            bail!("rabbitmq host cannot be empty");
        }

        let port = rabbitmq.port.unwrap_or(cli.port);
        let api_port = rabbitmq.api_port.unwrap_or(cli.api_port);
        if port == 0 {
            bail!("rabbitmq port must be non-zero");
        }
        if api_port == 0 {
            bail!("management API port must be non-zero");
        }

        let log_level = file
            .log_level
            .and_then(|s| parse_log_level(&s))
            .unwrap_or(cli.log_level);
        let log_file = file
            .log_file
            .map(PathBuf::from)
            .or_else(|| cli.log_file.clone());

        Ok(Self {
            broker: BrokerConfig {
                host: host.trim().to_string(),
                port,
                username: rabbitmq.username.unwrap_or_else(|| cli.username.clone()),
                password: rabbitmq.password.unwrap_or_else(|| cli.password.clone()),
                use_tls: rabbitmq.use_tls.unwrap_or(cli.use_tls),
                api_port,
                default_vhost: DEFAULT_VHOST.to_string(),
            },
            log_level,
            log_file,
        })
    }
}

/// Parses a log level string into LogLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_log_level(s: &str) -> Option<LogLevel> {
    LogLevel::from_str(s, true).ok()
}
