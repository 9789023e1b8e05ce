//! Region reconciliation (`dcim/regions`)

use crate::codec::{decode_optional_string, decode_reference, decode_tags, merge_custom_fields, Payload};
use crate::diagnostics::Diagnostics;
use crate::kind::{require_string, ResourceKind, WriteMode};
use crate::kinds::encode_slug;
use crate::resolve::{ReferenceSet, Resolved};
use netbox_client::{ObjectKind, Region};
use netbox_resources::{Attr, RegionState};

/// Regions, with parent and tag references
#[derive(Debug, Clone, Copy)]
pub struct RegionKind;

impl ResourceKind for RegionKind {
    type State = RegionState;
    type Remote = Region;

    const OBJECT_KIND: ObjectKind = ObjectKind::Region;

    fn id(state: &RegionState) -> &Attr<u64> {
        &state.id
    }

    fn id_mut(state: &mut RegionState) -> &mut Attr<u64> {
        &mut state.id
    }

    fn name(state: &RegionState) -> &Attr<String> {
        &state.name
    }

    fn validate(desired: &RegionState, _mode: WriteMode) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        require_string(&mut diagnostics, "name", &desired.name);
        diagnostics
    }

    fn references(desired: &RegionState) -> Vec<ReferenceSet> {
        let mut sets = Vec::new();
        if let Attr::Value(parent) = &desired.parent {
            sets.push(ReferenceSet::new("parent", ObjectKind::Region, vec![parent.clone()]));
        }
        if let Attr::Value(tags) = &desired.tags {
            sets.push(ReferenceSet::new("tags", ObjectKind::Tag, tags.clone()));
        }
        sets
    }

    fn encode(desired: &RegionState, resolved: &Resolved, mode: WriteMode) -> Result<serde_json::Value, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut payload = Payload::new();

        payload.optional_string("name", &desired.name);
        encode_slug(&mut payload, &desired.slug, &desired.name, mode);
        payload.reference("parent", &desired.parent, resolved);
        payload.optional_string("description", &desired.description);
        payload.tags(&desired.tags, resolved);
        if let Err(e) = payload.custom_fields(&desired.custom_fields) {
            diagnostics.push_at("custom_fields", e);
        }

        diagnostics.into_result(payload.into_value())
    }

    fn merge(local: &RegionState, remote: Region) -> Result<RegionState, Diagnostics> {
        let custom_fields = merge_custom_fields(&local.custom_fields, &remote.custom_fields)
            .map_err(|e| {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push_at("custom_fields", e);
                diagnostics
            })?;

        Ok(RegionState {
            id: Attr::Value(remote.id),
            name: Attr::Value(remote.name),
            slug: Attr::Value(remote.slug),
            parent: decode_reference(remote.parent.map(|p| p.id)),
            description: decode_optional_string(&local.description, remote.description),
            tags: Attr::Value(decode_tags(&remote.tags)),
            custom_fields: Attr::Value(custom_fields),
        })
    }
}
