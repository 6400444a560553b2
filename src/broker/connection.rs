//! Per-call broker connections.
//!
//! A [`BrokerConnector`] hands out a fresh connection + channel pair for
//! every handler invocation. Nothing here is pooled or cached: the channel
//! lives for exactly one [`with_channel`] scope and is closed on the way
//! out, whichever way the scope exits.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::warn;

use crate::error::ToolError;

/// Produces a new connection and operational channel per call.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrokerChannel>, ToolError>;
}

/// The operational channel of one exclusively-owned connection.
#[async_trait]
pub trait BrokerChannel: Send {
    /// Declares a durable-less, non-exclusive queue. A no-op if the queue
    /// already exists with compatible settings.
    async fn declare_queue(&mut self, queue: &str) -> Result<(), ToolError>;

    /// Declares a fanout exchange, idempotently.
    async fn declare_fanout_exchange(&mut self, exchange: &str) -> Result<(), ToolError>;

    /// Publishes `body` to `exchange` ("" is the default exchange).
    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), ToolError>;

    /// Closes the channel and its connection.
    async fn close(self: Box<Self>) -> Result<(), ToolError>;
}

/// Runs `op` against a freshly opened channel and closes it afterwards.
///
/// The channel is closed exactly once whether `op` succeeds or fails. The
/// operation's error wins over a close error; a close error on an otherwise
/// successful operation is only logged, since the broker already accepted
/// the work. If the returned future is dropped mid-flight, the channel's own
/// `Drop` takes care of tearing the connection down.
pub async fn with_channel<T, F>(connector: &dyn BrokerConnector, op: F) -> Result<T, ToolError>
where
    F: for<'c> FnOnce(&'c mut dyn BrokerChannel) -> BoxFuture<'c, Result<T, ToolError>>,
{
    let mut channel = connector.open().await?;
    let outcome = op(channel.as_mut()).await;
    if let Err(e) = channel.close().await {
        warn!("Failed to close broker connection: {}", e);
    }
    outcome
}
