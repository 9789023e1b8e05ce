//! Common utilities for NetBox API client
//!
//! Provides the authenticated HTTP wrapper shared by every gateway operation.

pub mod query;

use crate::error::NetBoxError;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Paginated response wrapper from NetBox API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
    }

    /// Map a non-success response onto the error taxonomy, keeping the body for context
    async fn check(response: Response, context: &str) -> Result<Response, NetBoxError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NetBoxError::from_status(status.as_u16(), context, body))
    }

    /// Decode a JSON body, logging a prefix of the raw text when it is malformed
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NetBoxError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            debug!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            );
            NetBoxError::Serialization(e)
        })
    }

    /// Fetch all pages of a paginated response
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        mut url: String,
    ) -> Result<Vec<T>, NetBoxError> {
        let mut all_results = Vec::new();

        loop {
            debug!("Fetching page: {}", url);

            let response = self.authorized(self.client.get(&url)).send().await?;
            let response = Self::check(response, "Fetching page").await?;
            let page: PaginatedResponse<T> = Self::decode(response).await?;
            all_results.extend(page.results);

            match page.next {
                Some(next_url) => {
                    url = self.build_url(&next_url);
                }
                None => break,
            }
        }

        Ok(all_results)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetBoxError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(response, &format!("GET {}", path)).await?;
        Self::decode(response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, NetBoxError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response, &format!("POST {}", path)).await?;
        Self::decode(response).await
    }

    /// Make a PATCH request
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, NetBoxError> {
        let url = self.build_url(path);
        debug!("PATCH {} with body: {}", url, body);

        let response = self
            .authorized(self.client.patch(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response, &format!("PATCH {}", path)).await?;
        Self::decode(response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), NetBoxError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::check(response, &format!("DELETE {}", path)).await?;
        Ok(())
    }

    /// Build query string from filters
    ///
    /// Repeated keys are kept; NetBox ORs them (`name=a&name=b`).
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> HttpClient {
        HttpClient::new(Client::new(), "http://netbox:80/".to_string(), "secret".to_string())
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let http = http();
        assert_eq!(http.base_url(), "http://netbox:80");
        assert_eq!(http.build_url("/api/status/"), "http://netbox:80/api/status/");
        assert_eq!(
            http.build_url("http://other/api/dcim/regions/?offset=50"),
            "http://other/api/dcim/regions/?offset=50"
        );
    }

    #[test]
    fn test_query_string_keeps_repeated_keys() {
        let qs = http().build_query_string(&[("name", "net"), ("name", "core dc")]);
        assert_eq!(qs, "name=net&name=core%20dc");
    }

    #[test]
    fn test_auth_header() {
        assert_eq!(http().auth_header(), "Token secret");
    }
}
