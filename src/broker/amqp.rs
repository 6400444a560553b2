//! AMQP 0-9-1 connector backed by lapin.

use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions, QueueDeclareOptions};
use lapin::tcp::{HandshakeResult, RustlsConnector, TcpStream};
use lapin::types::FieldTable;
use lapin::uri::AMQPUri;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::{debug, warn};

use super::connection::{BrokerChannel, BrokerConnector};
use super::tls;
use crate::config::BrokerConfig;
use crate::error::ToolError;

const REPLY_SUCCESS: u16 = 200;

/// Opens one AMQP connection per call using the shared broker config.
///
/// With `use_tls` the socket is wrapped by rustls using the restricted
/// profile from [`tls::client_config`] instead of lapin's default suites.
pub struct AmqpConnector {
    config: Arc<BrokerConfig>,
}

impl AmqpConnector {
    pub fn new(config: Arc<BrokerConfig>) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<Connection, ToolError> {
        let config = &self.config;
        let uri = config.amqp_uri();

        let connected = if config.use_tls {
            let connector = tls_connector()?;
            let uri: AMQPUri = uri
                .parse()
                .map_err(|e: String| ToolError::connection(format!("invalid broker URI: {}", e)))?;
            let host = config.host.clone();
            let port = config.port;
            Connection::connector(
                uri,
                Box::new(move |_uri: &AMQPUri| -> HandshakeResult {
                    TcpStream::connect((host.as_str(), port))?.into_rustls(&connector, &host)
                }),
                connection_properties(),
            )
            .await
        } else {
            Connection::connect(&uri, connection_properties()).await
        };

        connected.map_err(|e| {
            ToolError::connection(format!(
                "failed to connect to {}:{}: {}",
                config.host, config.port, e
            ))
        })
    }
}

/// Runs lapin's background I/O on the ambient tokio runtime.
fn connection_properties() -> ConnectionProperties {
    ConnectionProperties::default()
        .with_executor(tokio_executor_trait::Tokio::current())
        .with_reactor(tokio_reactor_trait::Tokio)
}

fn tls_connector() -> Result<RustlsConnector, ToolError> {
    let config = tls::client_config()
        .map_err(|e| ToolError::connection(format!("failed to build TLS profile: {}", e)))?;
    Ok(RustlsConnector::from(Arc::new(config)))
}

#[async_trait]
impl BrokerConnector for AmqpConnector {
    async fn open(&self) -> Result<Box<dyn BrokerChannel>, ToolError> {
        debug!(
            "Opening AMQP connection to {}:{} (tls: {})",
            self.config.host, self.config.port, self.config.use_tls
        );
        let connection = self.connect().await?;

        match connection.create_channel().await {
            Ok(channel) => Ok(Box::new(AmqpChannel {
                connection: Some(connection),
                channel,
            })),
            Err(e) => {
                if let Err(close_err) = connection.close(REPLY_SUCCESS, "OK").await {
                    warn!("Failed to close connection after channel error: {}", close_err);
                }
                Err(ToolError::connection(format!("failed to open channel: {}", e)))
            }
        }
    }
}

struct AmqpChannel {
    // Taken on close; still present on drop means the scope was abandoned.
    connection: Option<Connection>,
    channel: Channel,
}

fn operation_error(action: &str, err: lapin::Error) -> ToolError {
    match err {
        lapin::Error::IOError(_) | lapin::Error::InvalidConnectionState(_) => {
            ToolError::connection(format!("{}: {}", action, err))
        }
        other => ToolError::broker(format!("{}: {}", action, other)),
    }
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn declare_queue(&mut self, queue: &str) -> Result<(), ToolError> {
        self.channel
            .queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default())
            .await
            .map(|_| ())
            .map_err(|e| operation_error(&format!("declare queue '{}'", queue), e))
    }

    async fn declare_fanout_exchange(&mut self, exchange: &str) -> Result<(), ToolError> {
        self.channel
            .exchange_declare(
                exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| operation_error(&format!("declare exchange '{}'", exchange), e))
    }

    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), ToolError> {
        let confirm = self
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| operation_error("publish", e))?;
        confirm
            .await
            .map(|_| ())
            .map_err(|e| operation_error("publish", e))
    }

    async fn close(self: Box<Self>) -> Result<(), ToolError> {
        let mut this = self;
        match this.connection.take() {
            Some(connection) => connection
                .close(REPLY_SUCCESS, "OK")
                .await
                .map_err(|e| ToolError::connection(format!("close: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for AmqpChannel {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Closing abandoned AMQP connection");
                handle.spawn(async move {
                    if let Err(e) = connection.close(REPLY_SUCCESS, "OK").await {
                        warn!("Failed to close abandoned connection: {}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime available to close abandoned AMQP connection"),
        }
    }
}
