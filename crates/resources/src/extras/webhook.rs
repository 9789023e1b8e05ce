//! NetBox webhook state

use crate::attr::Attr;
use serde::{Deserialize, Serialize};

/// HTTP method NetBox uses to deliver a webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Desired or observed state of a NetBox webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebhookState {
    /// NetBox webhook ID (assigned on creation)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub id: Attr<u64>,

    /// Webhook name (required)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub name: Attr<String>,

    /// Object types that trigger the webhook, e.g. "dcim.site" (required, set semantics)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub content_types: Attr<Vec<String>>,

    /// Target URL (required)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub payload_url: Attr<String>,

    /// Deliver events at all
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub enabled: Attr<bool>,

    /// Fire on object creation
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub type_create: Attr<bool>,

    /// Fire on object update
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub type_update: Attr<bool>,

    /// Fire on object deletion
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub type_delete: Attr<bool>,

    /// Request method used for delivery
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub http_method: Attr<HttpMethod>,

    /// `Content-Type` of the request
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub http_content_type: Attr<String>,

    /// Extra headers, one `Name: value` per line
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub additional_headers: Attr<String>,

    /// Jinja2 body template
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub body_template: Attr<String>,

    /// HMAC secret used to sign the payload
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub secret: Attr<String>,

    /// Verify the receiver's TLS certificate
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub ssl_verification: Attr<bool>,

    /// CA bundle used for verification; null uses the system store
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub ca_file_path: Attr<String>,
}
