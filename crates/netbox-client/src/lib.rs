//! NetBox REST API Client
//!
//! A Rust gateway to the NetBox REST API used by the DCops inventory reconciler.
//! Operations are keyed by [`ObjectKind`] and exchange raw JSON, so one
//! gateway serves every resource kind; typed models for decoding live in
//! [`models`].
//!
//! # Example
//!
//! ```no_run
//! use netbox_client::{ClientConfig, NetBoxClient, NetBoxGateway, ObjectKind};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NetBoxClient::with_config(
//!     ClientConfig::new("http://netbox:80", "your-api-token")
//!         .with_timeout(Duration::from_secs(10)),
//! )?;
//!
//! // Look up tags by name (repeated keys are ORed)
//! let tags = client.list(ObjectKind::Tag, &[("name", "net"), ("name", "edge")]).await?;
//!
//! // Create a region
//! let region = client
//!     .create(ObjectKind::Region, &serde_json::json!({"name": "core", "slug": "core"}))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Generic CRUD**: create/retrieve/update/destroy/list for every object kind
//! - **Structured errors**: HTTP status is kept so 404 can be told apart from other failures
//! - **Pagination**: list calls follow `next` links until exhausted
//! - **Mocking**: `test-util` feature provides an in-memory [`MockNetBoxClient`]

pub mod client;
pub mod common;
pub mod error;
pub mod kind;
pub mod models;
#[path = "trait.rs"]
pub mod netbox_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{ClientConfig, NetBoxClient, DEFAULT_TIMEOUT};
pub use common::{HttpClient, PaginatedResponse};
pub use error::NetBoxError;
pub use kind::ObjectKind;
pub use models::*;
pub use netbox_trait::NetBoxGateway;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockCall, MockNetBoxClient};
