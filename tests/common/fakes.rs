//! Recording fakes for the broker seams
//!
//! [`RecordingConnector`] stands in for the AMQP transport and logs every
//! channel operation; [`FakeAdmin`] is an in-memory management API.

#![allow(dead_code)]

use async_trait::async_trait;
use rabbitmq_mcp::broker::{AdminApi, BrokerChannel, BrokerConnector};
use rabbitmq_mcp::ToolError;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

// ============================================================================
// AMQP
// ============================================================================

/// One observed interaction with the broker transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerOp {
    Open,
    DeclareQueue(String),
    DeclareFanout(String),
    Publish {
        exchange: String,
        routing_key: String,
        body: String,
    },
    Close,
}

#[derive(Clone, Copy, Default)]
enum Failure {
    #[default]
    None,
    RefuseConnection,
    RejectPublish,
}

/// Connector that hands out recording channels. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingConnector {
    ops: Arc<Mutex<Vec<BrokerOp>>>,
    failure: Failure,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `open` fails as an unreachable broker would.
    pub fn refusing() -> Self {
        Self {
            failure: Failure::RefuseConnection,
            ..Self::default()
        }
    }

    /// Connections open but the broker rejects every publish.
    pub fn rejecting_publish() -> Self {
        Self {
            failure: Failure::RejectPublish,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> Vec<BrokerOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.count(|op| *op == BrokerOp::Open)
    }

    pub fn closes(&self) -> usize {
        self.count(|op| *op == BrokerOp::Close)
    }

    pub fn publishes(&self) -> usize {
        self.count(|op| matches!(op, BrokerOp::Publish { .. }))
    }

    fn count(&self, predicate: impl Fn(&BrokerOp) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| predicate(op)).count()
    }
}

#[async_trait]
impl BrokerConnector for RecordingConnector {
    async fn open(&self) -> Result<Box<dyn BrokerChannel>, ToolError> {
        if let Failure::RefuseConnection = self.failure {
            return Err(ToolError::connection("connection refused"));
        }
        self.ops.lock().unwrap().push(BrokerOp::Open);
        Ok(Box::new(RecordingChannel {
            ops: self.ops.clone(),
            reject_publish: matches!(self.failure, Failure::RejectPublish),
        }))
    }
}

struct RecordingChannel {
    ops: Arc<Mutex<Vec<BrokerOp>>>,
    reject_publish: bool,
}

impl RecordingChannel {
    fn record(&self, op: BrokerOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl BrokerChannel for RecordingChannel {
    async fn declare_queue(&mut self, queue: &str) -> Result<(), ToolError> {
        self.record(BrokerOp::DeclareQueue(queue.to_string()));
        Ok(())
    }

    async fn declare_fanout_exchange(&mut self, exchange: &str) -> Result<(), ToolError> {
        self.record(BrokerOp::DeclareFanout(exchange.to_string()));
        Ok(())
    }

    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), ToolError> {
        if self.reject_publish {
            return Err(ToolError::broker("NOT_ALLOWED - publish rejected"));
        }
        self.record(BrokerOp::Publish {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ToolError> {
        self.record(BrokerOp::Close);
        Ok(())
    }
}

// ============================================================================
// Management API
// ============================================================================

#[derive(Default)]
struct Entities {
    queues: Vec<(String, Map<String, Value>)>,
    exchanges: Vec<(String, Map<String, Value>)>,
}

/// In-memory management API. Listings keep insertion order.
#[derive(Clone, Default)]
pub struct FakeAdmin {
    entities: Arc<Mutex<Entities>>,
    calls: Arc<Mutex<Vec<String>>>,
}

fn entity(name: &str, vhost: &str, extra: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".to_string(), json!(name));
    map.insert("vhost".to_string(), json!(vhost));
    if let Value::Object(extra) = extra {
        map.extend(extra);
    }
    map
}

fn find<'a>(
    list: &'a mut Vec<(String, Map<String, Value>)>,
    vhost: &str,
    name: &str,
) -> Option<&'a mut Map<String, Value>> {
    list.iter_mut()
        .find(|(v, e)| v == vhost && e.get("name") == Some(&json!(name)))
        .map(|(_, e)| e)
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(self, vhost: &str, name: &str, messages: u64) -> Self {
        self.entities.lock().unwrap().queues.push((
            vhost.to_string(),
            entity(name, vhost, json!({"messages": messages, "durable": false})),
        ));
        self
    }

    pub fn with_exchange(self, vhost: &str, name: &str, kind: &str) -> Self {
        self.entities.lock().unwrap().exchanges.push((
            vhost.to_string(),
            entity(name, vhost, json!({"type": kind})),
        ));
        self
    }

    /// Calls received so far, as `"<operation> <vhost> [<name>]"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queue_messages(&self, vhost: &str, name: &str) -> Option<u64> {
        let mut entities = self.entities.lock().unwrap();
        find(&mut entities.queues, vhost, name)
            .and_then(|q| q.get("messages"))
            .and_then(Value::as_u64)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn list_queues(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        self.record(format!("list_queues {}", vhost));
        let entities = self.entities.lock().unwrap();
        Ok(entities
            .queues
            .iter()
            .filter(|(v, _)| v == vhost)
            .map(|(_, q)| Value::Object(q.clone()))
            .collect())
    }

    async fn list_exchanges(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        self.record(format!("list_exchanges {}", vhost));
        let entities = self.entities.lock().unwrap();
        Ok(entities
            .exchanges
            .iter()
            .filter(|(v, _)| v == vhost)
            .map(|(_, e)| Value::Object(e.clone()))
            .collect())
    }

    async fn get_queue_info(
        &self,
        vhost: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        self.record(format!("get_queue_info {} {}", vhost, name));
        let mut entities = self.entities.lock().unwrap();
        find(&mut entities.queues, vhost, name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(format!("queue '{}'", name)))
    }

    async fn get_exchange_info(
        &self,
        vhost: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        self.record(format!("get_exchange_info {} {}", vhost, name));
        let mut entities = self.entities.lock().unwrap();
        find(&mut entities.exchanges, vhost, name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(format!("exchange '{}'", name)))
    }

    async fn delete_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        self.record(format!("delete_queue {} {}", vhost, name));
        let mut entities = self.entities.lock().unwrap();
        let before = entities.queues.len();
        entities
            .queues
            .retain(|(v, q)| !(v == vhost && q.get("name") == Some(&json!(name))));
        if entities.queues.len() == before {
            return Err(ToolError::NotFound(format!("queue '{}'", name)));
        }
        Ok(())
    }

    async fn purge_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        self.record(format!("purge_queue {} {}", vhost, name));
        let mut entities = self.entities.lock().unwrap();
        let queue = find(&mut entities.queues, vhost, name)
            .ok_or_else(|| ToolError::NotFound(format!("queue '{}'", name)))?;
        queue.insert("messages".to_string(), json!(0));
        Ok(())
    }

    async fn delete_exchange(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        self.record(format!("delete_exchange {} {}", vhost, name));
        let mut entities = self.entities.lock().unwrap();
        let before = entities.exchanges.len();
        entities
            .exchanges
            .retain(|(v, e)| !(v == vhost && e.get("name") == Some(&json!(name))));
        if entities.exchanges.len() == before {
            return Err(ToolError::NotFound(format!("exchange '{}'", name)));
        }
        Ok(())
    }
}
