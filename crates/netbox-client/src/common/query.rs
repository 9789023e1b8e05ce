//! Query utilities for NetBox API
//!
//! Provides helpers for building filtered list queries and handling pagination.

use crate::common::HttpClient;
use crate::error::NetBoxError;
use crate::kind::ObjectKind;
use serde::de::DeserializeOwned;

/// Query every page of a collection with optional filtering
pub async fn query_resources<T: DeserializeOwned>(
    http: &HttpClient,
    kind: ObjectKind,
    filters: &[(&str, &str)],
) -> Result<Vec<T>, NetBoxError> {
    let mut url = kind.collection_path();

    if !filters.is_empty() {
        let query_string = http.build_query_string(filters);
        url = format!("{}?{}", url, query_string);
    }

    http.fetch_all_pages(http.build_url(&url)).await
}
