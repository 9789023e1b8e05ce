//! Gateway trait for the NetBox API
//!
//! This trait abstracts the NetBox REST API so the reconciler can be driven
//! against the real client or an in-memory mock. Payloads and responses are
//! raw JSON; typed decoding is the caller's concern.

use crate::error::NetBoxError;
use crate::kind::ObjectKind;

/// Typed create/retrieve/update/destroy/list operations per object kind
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
/// Implementations hold no per-call mutable state, so one handle can serve
/// concurrent operations against different objects.
#[async_trait::async_trait]
pub trait NetBoxGateway: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), NetBoxError>;

    /// POST a new object; returns the object as stored by NetBox
    async fn create(&self, kind: ObjectKind, payload: &serde_json::Value) -> Result<serde_json::Value, NetBoxError>;

    /// GET one object; `NetBoxError::NotFound` when it does not exist
    async fn retrieve(&self, kind: ObjectKind, id: u64) -> Result<serde_json::Value, NetBoxError>;

    /// PATCH one object; `NetBoxError::NotFound` when it does not exist
    async fn update(&self, kind: ObjectKind, id: u64, payload: &serde_json::Value) -> Result<serde_json::Value, NetBoxError>;

    /// DELETE one object; `NetBoxError::NotFound` when it does not exist
    async fn destroy(&self, kind: ObjectKind, id: u64) -> Result<(), NetBoxError>;

    /// List every object matching the filters (all pages)
    async fn list(&self, kind: ObjectKind, filters: &[(&str, &str)]) -> Result<Vec<serde_json::Value>, NetBoxError>;
}
