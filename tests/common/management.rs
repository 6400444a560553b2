//! Management API stubs
//!
//! Starts a wiremock server and builds a [`ManagementClient`] pointed at its
//! `/api` root. Tests mount their own expectations on the returned server;
//! anything unmatched answers 404 like a missing broker object.

#![allow(dead_code)]

use super::session::test_broker_config;
use rabbitmq_mcp::broker::ManagementClient;
use wiremock::MockServer;

/// Management API base URL served by `server`
pub fn api_base_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

/// Starts an empty management API stub.
pub async fn management_api() -> MockServer {
    MockServer::start().await
}

/// A management client for the test credentials talking to `server`.
pub fn management_client(server: &MockServer) -> ManagementClient {
    ManagementClient::with_base_url(&test_broker_config(), api_base_url(server))
        .expect("Failed to build management client")
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("Failed to read ephemeral port")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}
