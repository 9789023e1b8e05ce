//! Cluster type reconciliation (`virtualization/cluster-types`)

use crate::codec::{decode_optional_string, decode_tags, merge_custom_fields, Payload};
use crate::diagnostics::Diagnostics;
use crate::kind::{require_string, ResourceKind, WriteMode};
use crate::kinds::encode_slug;
use crate::resolve::{ReferenceSet, Resolved};
use netbox_client::{ClusterType, ObjectKind};
use netbox_resources::{Attr, ClusterTypeState};

/// Cluster types
#[derive(Debug, Clone, Copy)]
pub struct ClusterTypeKind;

impl ResourceKind for ClusterTypeKind {
    type State = ClusterTypeState;
    type Remote = ClusterType;

    const OBJECT_KIND: ObjectKind = ObjectKind::ClusterType;

    fn id(state: &ClusterTypeState) -> &Attr<u64> {
        &state.id
    }

    fn id_mut(state: &mut ClusterTypeState) -> &mut Attr<u64> {
        &mut state.id
    }

    fn name(state: &ClusterTypeState) -> &Attr<String> {
        &state.name
    }

    fn validate(desired: &ClusterTypeState, _mode: WriteMode) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        require_string(&mut diagnostics, "name", &desired.name);
        diagnostics
    }

    fn references(desired: &ClusterTypeState) -> Vec<ReferenceSet> {
        match &desired.tags {
            Attr::Value(tags) => vec![ReferenceSet::new("tags", ObjectKind::Tag, tags.clone())],
            _ => Vec::new(),
        }
    }

    fn encode(desired: &ClusterTypeState, resolved: &Resolved, mode: WriteMode) -> Result<serde_json::Value, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut payload = Payload::new();

        payload.optional_string("name", &desired.name);
        encode_slug(&mut payload, &desired.slug, &desired.name, mode);
        payload.optional_string("description", &desired.description);
        payload.tags(&desired.tags, resolved);
        if let Err(e) = payload.custom_fields(&desired.custom_fields) {
            diagnostics.push_at("custom_fields", e);
        }

        diagnostics.into_result(payload.into_value())
    }

    fn merge(local: &ClusterTypeState, remote: ClusterType) -> Result<ClusterTypeState, Diagnostics> {
        let custom_fields = merge_custom_fields(&local.custom_fields, &remote.custom_fields)
            .map_err(|e| {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push_at("custom_fields", e);
                diagnostics
            })?;

        Ok(ClusterTypeState {
            id: Attr::Value(remote.id),
            name: Attr::Value(remote.name),
            slug: Attr::Value(remote.slug),
            description: decode_optional_string(&local.description, remote.description),
            tags: Attr::Value(decode_tags(&remote.tags)),
            custom_fields: Attr::Value(custom_fields),
        })
    }
}
