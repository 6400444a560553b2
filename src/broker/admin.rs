//! HTTP client for the broker's management API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::BrokerConfig;
use crate::error::ToolError;

/// Inspection and lifecycle operations served by the management API.
///
/// Listings come back in broker order and entity details are passed through
/// verbatim; nothing is reshaped here.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_queues(&self, vhost: &str) -> Result<Vec<Value>, ToolError>;
    async fn list_exchanges(&self, vhost: &str) -> Result<Vec<Value>, ToolError>;
    async fn get_queue_info(&self, vhost: &str, name: &str)
        -> Result<Map<String, Value>, ToolError>;
    async fn get_exchange_info(
        &self,
        vhost: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ToolError>;
    async fn delete_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError>;
    async fn purge_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError>;
    async fn delete_exchange(&self, vhost: &str, name: &str) -> Result<(), ToolError>;
}

/// reqwest-backed [`AdminApi`]. Uses the broker credentials with basic auth
/// and, when TLS is on, the restricted TLS profile from [`super::tls`].
pub struct ManagementClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ManagementClient {
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        Self::with_base_url(config, config.admin_base_url())
    }

    /// Like [`ManagementClient::new`] but against an explicit base URL.
    pub fn with_base_url(config: &BrokerConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.use_tls {
            let tls = super::tls::client_config().context("Failed to build TLS profile")?;
            builder = builder.use_preconfigured_tls(tls);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: &str, vhost: &str) -> String {
        format!("{}/{}/{}", self.base_url, kind, urlencoding::encode(vhost))
    }

    fn entity_url(&self, kind: &str, vhost: &str, name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            kind,
            urlencoding::encode(vhost),
            urlencoding::encode(name)
        )
    }

    /// Sends the request and turns any non-2xx answer into a typed error.
    async fn send(&self, request: RequestBuilder, target: &str) -> Result<Response, ToolError> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                ToolError::connection(format!("management API unreachable for {}: {}", target, e))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, target, &body))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        target: &str,
    ) -> Result<T, ToolError> {
        debug!("GET {}", url);
        self.send(self.client.get(url), target)
            .await?
            .json()
            .await
            .map_err(|e| ToolError::broker(format!("invalid response for {}: {}", target, e)))
    }

    async fn delete(&self, url: &str, target: &str) -> Result<(), ToolError> {
        debug!("DELETE {}", url);
        self.send(self.client.delete(url), target).await.map(|_| ())
    }
}

/// Maps a failed management API status onto the error taxonomy.
pub fn status_error(status: StatusCode, target: &str, body: &str) -> ToolError {
    match status {
        StatusCode::NOT_FOUND => ToolError::NotFound(target.to_string()),
        StatusCode::UNAUTHORIZED => {
            ToolError::connection(format!("authentication rejected while accessing {}", target))
        }
        _ => {
            let body = body.trim();
            if body.is_empty() {
                ToolError::broker(format!("{} returned {}", target, status))
            } else {
                ToolError::broker(format!("{} returned {}: {}", target, status, body))
            }
        }
    }
}

#[async_trait]
impl AdminApi for ManagementClient {
    async fn list_queues(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        let url = self.collection_url("queues", vhost);
        self.get_json(&url, &format!("queues in vhost '{}'", vhost))
            .await
    }

    async fn list_exchanges(&self, vhost: &str) -> Result<Vec<Value>, ToolError> {
        let url = self.collection_url("exchanges", vhost);
        self.get_json(&url, &format!("exchanges in vhost '{}'", vhost))
            .await
    }

    async fn get_queue_info(
        &self,
        vhost: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        let url = self.entity_url("queues", vhost, name);
        self.get_json(&url, &format!("queue '{}'", name)).await
    }

    async fn get_exchange_info(
        &self,
        vhost: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ToolError> {
        let url = self.entity_url("exchanges", vhost, name);
        self.get_json(&url, &format!("exchange '{}'", name)).await
    }

    async fn delete_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        let url = self.entity_url("queues", vhost, name);
        self.delete(&url, &format!("queue '{}'", name)).await
    }

    async fn purge_queue(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        let url = format!("{}/contents", self.entity_url("queues", vhost, name));
        self.delete(&url, &format!("queue '{}'", name)).await
    }

    async fn delete_exchange(&self, vhost: &str, name: &str) -> Result<(), ToolError> {
        let url = self.entity_url("exchanges", vhost, name);
        self.delete(&url, &format!("exchange '{}'", name)).await
    }
}
