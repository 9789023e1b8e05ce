//! NetBox cluster type state

use crate::attr::Attr;
use crate::custom_fields::CustomFieldMap;
use crate::reference::Reference;
use serde::{Deserialize, Serialize};

/// Desired or observed state of a NetBox cluster type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClusterTypeState {
    /// NetBox cluster type ID (assigned on creation)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub id: Attr<u64>,

    /// Cluster type name (required)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub name: Attr<String>,

    /// Cluster type slug (derived from the name on creation if unknown)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub slug: Attr<String>,

    /// Description of the cluster type
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub description: Attr<String>,

    /// Tags, by id or name (set semantics)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub tags: Attr<Vec<Reference>>,

    /// Custom fields managed on this cluster type; other keys are left alone
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub custom_fields: Attr<CustomFieldMap>,
}
