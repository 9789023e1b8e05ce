//! Desired-state manifest
//!
//! ```yaml
//! tags:
//!   net:
//!     name: net
//!     color: "2196f3"
//! regions:
//!   core:
//!     name: core
//!     parent: null
//!     tags: [net]
//!     custom_fields:
//!       owner: ops
//! ```
//!
//! Each map key is a local address that identifies the object across passes.

use crate::error::ControllerError;
use netbox_resources::{ClusterTypeState, RegionState, TagState, WebhookState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Desired objects, by kind and local address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub tags: BTreeMap<String, TagState>,
    pub cluster_types: BTreeMap<String, ClusterTypeState>,
    pub regions: BTreeMap<String, RegionState>,
    pub webhooks: BTreeMap<String, WebhookState>,
}

impl Manifest {
    /// Parse manifest YAML; `path` is only used in errors
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ControllerError> {
        serde_yaml::from_str(contents).map_err(|source| ControllerError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse the manifest at `path`
    pub async fn load(path: &Path) -> Result<Self, ControllerError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|source| ControllerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Number of declared objects across every kind
    pub fn len(&self) -> usize {
        self.tags.len() + self.cluster_types.len() + self.regions.len() + self.webhooks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbox_resources::{Attr, HttpMethod, Reference};

    #[test]
    fn test_parse_every_kind() {
        let manifest = Manifest::parse(
            Path::new("netbox.yaml"),
            r#"
tags:
  net: { name: net, color: "2196f3" }
cluster_types:
  kvm: { name: KVM, tags: [net] }
regions:
  core:
    name: core
    parent: 3
    custom_fields: { owner: ops }
webhooks:
  inventory:
    name: inventory
    payload_url: https://hooks.example.net/netbox
    content_types: [dcim.region]
    type_create: true
    http_method: PATCH
"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 4);
        assert_eq!(manifest.tags["net"].color, Attr::Value("2196f3".to_string()));
        assert_eq!(manifest.regions["core"].parent, Attr::Value(Reference::Id(3)));
        assert_eq!(manifest.webhooks["inventory"].http_method, Attr::Value(HttpMethod::Patch));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse(Path::new("netbox.yaml"), "{}").unwrap();
        assert_eq!(manifest.len(), 0);
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        let err = Manifest::parse(Path::new("netbox.yaml"), "sites: {}").unwrap_err();
        assert!(matches!(err, ControllerError::Manifest { .. }));
    }
}
