//! NetBox tag state

use crate::attr::Attr;
use serde::{Deserialize, Serialize};

/// Desired or observed state of a NetBox tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TagState {
    /// NetBox tag ID (assigned on creation)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub id: Attr<u64>,

    /// Tag name (required)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub name: Attr<String>,

    /// Tag slug (derived from the name on creation if unknown)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub slug: Attr<String>,

    /// Tag color (hex color code without '#', e.g., "9e9e9e")
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub color: Attr<String>,

    /// Description of the tag
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub description: Attr<String>,
}
