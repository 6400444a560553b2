//! One handler per broker operation.
//!
//! Each handler validates its inputs, acquires a connection or goes through
//! the admin client, performs exactly one broker action and reports the
//! outcome. Nothing is retried.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use super::admin::AdminApi;
use super::connection::{with_channel, BrokerConnector};
use super::validate::{validate_message, validate_name};
use crate::error::ToolError;

const QUEUE_LABEL: &str = "Queue name";
const EXCHANGE_LABEL: &str = "Exchange name";

/// The default exchange: routes by queue name.
const DEFAULT_EXCHANGE: &str = "";

#[derive(Clone)]
pub struct BrokerHandlers {
    connector: Arc<dyn BrokerConnector>,
    admin: Arc<dyn AdminApi>,
}

fn validate_vhost(vhost: &str) -> Result<(), ToolError> {
    if vhost.trim().is_empty() {
        return Err(ToolError::validation("Virtual host cannot be empty"));
    }
    Ok(())
}

impl BrokerHandlers {
    pub fn new(connector: Arc<dyn BrokerConnector>, admin: Arc<dyn AdminApi>) -> Self {
        Self { connector, admin }
    }

    /// Declares `queue` and publishes `message` to it through the default
    /// exchange.
    pub async fn enqueue(&self, queue: &str, message: &str) -> Result<String, ToolError> {
        validate_name(queue, QUEUE_LABEL)?;
        validate_message(message)?;

        let target = queue.to_string();
        let body = message.as_bytes().to_vec();
        with_channel(self.connector.as_ref(), move |channel| {
            Box::pin(async move {
                channel.declare_queue(&target).await?;
                channel.publish(DEFAULT_EXCHANGE, &target, &body).await
            })
        })
        .await?;

        info!("Enqueued {} bytes to queue '{}'", message.len(), queue);
        Ok(format!("Message successfully enqueued to queue '{}'", queue))
    }

    /// Declares `exchange` as fanout and broadcasts `message` to every bound
    /// queue.
    pub async fn fanout(&self, exchange: &str, message: &str) -> Result<String, ToolError> {
        validate_name(exchange, EXCHANGE_LABEL)?;
        validate_message(message)?;

        let target = exchange.to_string();
        let body = message.as_bytes().to_vec();
        with_channel(self.connector.as_ref(), move |channel| {
            Box::pin(async move {
                channel.declare_fanout_exchange(&target).await?;
                channel.publish(&target, "", &body).await
            })
        })
        .await?;

        info!("Published {} bytes to fanout exchange '{}'", message.len(), exchange);
        Ok(format!(
            "Message successfully published to fanout exchange '{}'",
            exchange
        ))
    }

    pub async fn list_queues(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        validate_vhost(vhost)?;
        self.admin.list_queues(vhost).await
    }

    pub async fn list_exchanges(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        validate_vhost(vhost)?;
        self.admin.list_exchanges(vhost).await
    }

    pub async fn get_queue_info(
        &self,
        queue: &str,
        vhost: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        validate_name(queue, QUEUE_LABEL)?;
        validate_vhost(vhost)?;
        self.admin.get_queue_info(vhost, queue).await
    }

    pub async fn get_exchange_info(
        &self,
        exchange: &str,
        vhost: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        validate_name(exchange, EXCHANGE_LABEL)?;
        validate_vhost(vhost)?;
        self.admin.get_exchange_info(vhost, exchange).await
    }

    pub async fn delete_queue(&self, queue: &str, vhost: &str) -> Result<String, ToolError> {
        validate_name(queue, QUEUE_LABEL)?;
        validate_vhost(vhost)?;
        self.admin.delete_queue(vhost, queue).await?;
        info!("Deleted queue '{}' in vhost '{}'", queue, vhost);
        Ok(format!("Queue '{}' deleted successfully", queue))
    }

    pub async fn purge_queue(&self, queue: &str, vhost: &str) -> Result<String, ToolError> {
        validate_name(queue, QUEUE_LABEL)?;
        validate_vhost(vhost)?;
        self.admin.purge_queue(vhost, queue).await?;
        info!("Purged queue '{}' in vhost '{}'", queue, vhost);
        Ok(format!("Queue '{}' purged successfully", queue))
    }

    pub async fn delete_exchange(&self, exchange: &str, vhost: &str) -> Result<String, ToolError> {
        validate_name(exchange, EXCHANGE_LABEL)?;
        validate_vhost(vhost)?;
        self.admin.delete_exchange(vhost, exchange).await?;
        info!("Deleted exchange '{}' in vhost '{}'", exchange, vhost);
        Ok(format!("Exchange '{}' deleted successfully", exchange))
    }
}
