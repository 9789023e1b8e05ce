//! NetBox API client
//!
//! Implements the gateway over the NetBox REST API. Every object kind shares
//! the same URL scheme: `/api/<endpoint>/` for the collection and
//! `/api/<endpoint>/<id>/` for one object.

use crate::common::query::query_resources;
use crate::common::HttpClient;
use crate::error::NetBoxError;
use crate::kind::ObjectKind;
use crate::netbox_trait::NetBoxGateway;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`NetBoxClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NetBox base URL (e.g., "http://netbox:80")
    pub base_url: String,
    /// API token for authentication
    pub token: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings with the default timeout
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// NetBox API client
#[derive(Debug, Clone)]
pub struct NetBoxClient {
    http: HttpClient,
}

impl NetBoxClient {
    /// Create a new NetBox client with the default timeout
    ///
    /// # Arguments
    /// * `base_url` - NetBox base URL (e.g., "http://netbox:80")
    /// * `token` - API token for authentication
    pub fn new(base_url: String, token: String) -> Result<Self, NetBoxError> {
        Self::with_config(ClientConfig::new(base_url, token))
    }

    /// Create a new NetBox client from explicit settings
    pub fn with_config(config: ClientConfig) -> Result<Self, NetBoxError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(NetBoxError::InvalidRequest(format!(
                "base URL must start with http:// or https://, got {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http: HttpClient::new(client, config.base_url, config.token),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a simple authenticated request.
    ///
    /// This method tests connectivity and token validity before proceeding with operations.
    /// It makes a lightweight request to the NetBox status endpoint.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and NetBox is reachable
    /// * `Err(NetBoxError)` - Token is invalid or NetBox is unreachable
    pub async fn validate_token(&self) -> Result<(), NetBoxError> {
        debug!("Validating NetBox token and connectivity");
        let _: serde_json::Value = self.http.get("/api/status/").await?;
        debug!("Token validated successfully");
        Ok(())
    }
}

#[async_trait::async_trait]
impl NetBoxGateway for NetBoxClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        self.validate_token().await
    }

    async fn create(&self, kind: ObjectKind, payload: &serde_json::Value) -> Result<serde_json::Value, NetBoxError> {
        debug!("Creating {} in NetBox", kind);
        self.http.post(&kind.collection_path(), payload).await
    }

    async fn retrieve(&self, kind: ObjectKind, id: u64) -> Result<serde_json::Value, NetBoxError> {
        debug!("Fetching {} {} from NetBox", kind, id);
        self.http.get(&kind.object_path(id)).await
    }

    async fn update(&self, kind: ObjectKind, id: u64, payload: &serde_json::Value) -> Result<serde_json::Value, NetBoxError> {
        debug!("Updating {} {} in NetBox", kind, id);
        self.http.patch(&kind.object_path(id), payload).await
    }

    async fn destroy(&self, kind: ObjectKind, id: u64) -> Result<(), NetBoxError> {
        debug!("Deleting {} {} from NetBox", kind, id);
        self.http.delete(&kind.object_path(id)).await
    }

    async fn list(&self, kind: ObjectKind, filters: &[(&str, &str)]) -> Result<Vec<serde_json::Value>, NetBoxError> {
        debug!("Querying {} objects with filters: {:?}", kind, filters);
        query_resources(&self.http, kind, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let err = NetBoxClient::new("netbox:80".to_string(), "t".to_string()).unwrap_err();
        assert!(matches!(err, NetBoxError::InvalidRequest(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("http://netbox", "t");
        assert_eq!(config.timeout, Duration::from_secs(10));
        let config = config.with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
