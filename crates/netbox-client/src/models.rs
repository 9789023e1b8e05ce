//! NetBox API models
//!
//! These models match the NetBox REST API serializers for the object kinds
//! the reconciler manages. Optional server-side fields default when absent,
//! but a field present with the wrong JSON type is a deserialization error.

use serde::{Deserialize, Serialize};

/// Region model matching NetBox RegionSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Region {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<NestedRegion>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub created: Option<String>, // ISO 8601 datetime
    #[serde(default)]
    pub last_updated: Option<String>, // ISO 8601 datetime
}

/// Tag model matching NetBox TagSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Tag {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: String, // hex color without '#', e.g. "9e9e9e"
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Cluster type model matching NetBox ClusterTypeSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClusterType {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Webhook model matching NetBox WebhookSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Webhook {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    #[serde(default)]
    pub content_types: Vec<String>, // e.g. "dcim.site"
    #[serde(default)]
    pub type_create: bool,
    #[serde(default)]
    pub type_update: bool,
    #[serde(default)]
    pub type_delete: bool,
    pub payload_url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub http_content_type: String,
    #[serde(default)]
    pub additional_headers: String,
    #[serde(default)]
    pub body_template: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub ssl_verification: bool,
    #[serde(default)]
    pub ca_file_path: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

// Nested serializers (simplified versions for references)

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedTag {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedRegion {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub _depth: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_minimal_payload() {
        let region: Region = serde_json::from_value(json!({
            "id": 42,
            "url": "http://netbox/api/dcim/regions/42/",
            "name": "core",
            "slug": "core",
            "parent": null
        }))
        .unwrap();
        assert_eq!(region.id, 42);
        assert!(region.parent.is_none());
        assert!(region.tags.is_empty());
        assert!(region.custom_fields.is_empty());
    }

    #[test]
    fn test_region_type_mismatch_is_rejected() {
        let result: Result<Region, _> = serde_json::from_value(json!({
            "id": "forty-two",
            "url": "http://netbox/api/dcim/regions/42/",
            "name": "core",
            "slug": "core"
        }));
        assert!(result.is_err());
    }
}
