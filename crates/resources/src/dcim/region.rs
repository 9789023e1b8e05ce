//! NetBox region state
//!
//! Regions are hierarchical; `parent` points at another region and may be
//! explicitly null for a top-level region.

use crate::attr::Attr;
use crate::custom_fields::CustomFieldMap;
use crate::reference::Reference;
use serde::{Deserialize, Serialize};

/// Desired or observed state of a NetBox region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegionState {
    /// NetBox region ID (assigned on creation)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub id: Attr<u64>,

    /// Region name (required)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub name: Attr<String>,

    /// Region slug (derived from the name on creation if unknown)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub slug: Attr<String>,

    /// Parent region, by id or name; `null` for a top-level region
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub parent: Attr<Reference>,

    /// Description of the region
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub description: Attr<String>,

    /// Tags, by id or name (set semantics)
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub tags: Attr<Vec<Reference>>,

    /// Custom fields managed on this region; other keys are left alone
    #[serde(default, skip_serializing_if = "Attr::is_unknown")]
    pub custom_fields: Attr<CustomFieldMap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_entry() {
        let region: RegionState = serde_yaml::from_str(
            "name: core\nslug: core\nparent: null\ntags: [net, 7]\ncustom_fields:\n  owner: ops\n  ticket: null\n",
        )
        .unwrap();

        assert_eq!(region.id, Attr::Unknown);
        assert_eq!(region.parent, Attr::Null);
        assert_eq!(region.description, Attr::Unknown);
        assert_eq!(
            region.tags,
            Attr::Value(vec![Reference::Name("net".to_string()), Reference::Id(7)])
        );
        let fields = region.custom_fields.value().unwrap();
        assert_eq!(fields.get("owner"), Some(&Some("ops".to_string())));
        assert_eq!(fields.get("ticket"), Some(&None));
    }
}
