use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// TOML configuration file. Every field is optional; present values
/// override the corresponding CLI arguments.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,

    pub rabbitmq: Option<RabbitMqFileConfig>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct RabbitMqFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: Option<bool>,
}

impl std::fmt::Debug for RabbitMqFileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitMqFileConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_port", &self.api_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
