use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rabbitmq_mcp::broker::{AmqpConnector, BrokerHandlers, ManagementClient};
use rabbitmq_mcp::config::{self, LogLevel};
use rabbitmq_mcp::mcp::{create_mcp_state, serve_stdio, ToolContext};

#[derive(Parser, Debug)]
#[clap(version, about = "MCP server exposing RabbitMQ publishing and administration tools")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Broker host name. Can also be specified in config file.
    #[clap(long, env = "RABBITMQ_HOST")]
    pub rabbitmq_host: Option<String>,

    /// AMQP port.
    #[clap(long, env = "RABBITMQ_PORT", default_value_t = config::DEFAULT_AMQP_PORT)]
    pub rabbitmq_port: u16,

    #[clap(long, env = "RABBITMQ_USERNAME", default_value = "guest")]
    pub rabbitmq_username: String,

    #[clap(long, env = "RABBITMQ_PASSWORD", default_value = "guest", hide_env_values = true)]
    pub rabbitmq_password: String,

    /// Connect with TLS (amqps, https) to both AMQP and the management API.
    #[clap(long)]
    pub use_tls: bool,

    /// Port of the HTTP management API.
    #[clap(long, default_value_t = config::DEFAULT_API_PORT)]
    pub api_port: u16,

    #[clap(long, value_enum, ignore_case = true, default_value = "warning")]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stderr.
    #[clap(long)]
    pub log_file: Option<PathBuf>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            host: args.rabbitmq_host.clone(),
            port: args.rabbitmq_port,
            api_port: args.api_port,
            username: args.rabbitmq_username.clone(),
            password: args.rabbitmq_password.clone(),
            use_tls: args.use_tls,
            log_level: args.log_level,
            log_file: args.log_file.clone(),
        }
    }
}

/// stdout carries the protocol, so logs go to stderr or an append-only file.
fn init_tracing(app_config: &config::AppConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(app_config.log_level.level_filter().into())
        .with_env_var("LOG_LEVEL")
        .from_env_lossy();

    let (file_layer, stderr_layer) = match &app_config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => Some(config::FileConfig::load(path)?),
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    init_tracing(&app_config)?;

    if let Some(path) = &cli_args.config {
        info!("Configuration loaded from {:?}", path);
    }
    info!("Broker: {:?}", app_config.broker);

    let broker_config = Arc::new(app_config.broker.clone());
    let connector = Arc::new(AmqpConnector::new(broker_config.clone()));
    let admin = Arc::new(ManagementClient::new(&broker_config)?);
    info!("Management API at {}", admin.base_url());

    let handlers = BrokerHandlers::new(connector, admin);
    let ctx = ToolContext::new(handlers, broker_config);
    let state = create_mcp_state(ctx).context("Tool registry is incomplete")?;

    info!("Serving MCP over stdio");
    serve_stdio(Arc::new(state)).await?;
    info!("Input closed, shutting down");
    Ok(())
}
