//! Broker adapter layer
//!
//! Name validation, per-call AMQP connections, the management API client
//! and the handlers that compose them into single broker actions.

pub mod admin;
pub mod amqp;
pub mod connection;
pub mod handlers;
pub mod tls;
pub mod validate;

pub use admin::{AdminApi, ManagementClient};
pub use amqp::AmqpConnector;
pub use connection::{with_channel, BrokerChannel, BrokerConnector};
pub use handlers::BrokerHandlers;
pub use validate::{validate_message, validate_name};
