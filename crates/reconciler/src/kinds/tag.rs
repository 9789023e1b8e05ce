//! Tag reconciliation (`extras/tags`)

use crate::codec::{decode_optional_string, Payload};
use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::kind::{require_string, ResourceKind, WriteMode};
use crate::kinds::encode_slug;
use crate::resolve::Resolved;
use netbox_client::{ObjectKind, Tag};
use netbox_resources::{Attr, TagState};

/// Tags
#[derive(Debug, Clone, Copy)]
pub struct TagKind;

fn is_hex_color(color: &str) -> bool {
    color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit())
}

impl ResourceKind for TagKind {
    type State = TagState;
    type Remote = Tag;

    const OBJECT_KIND: ObjectKind = ObjectKind::Tag;

    fn id(state: &TagState) -> &Attr<u64> {
        &state.id
    }

    fn id_mut(state: &mut TagState) -> &mut Attr<u64> {
        &mut state.id
    }

    fn name(state: &TagState) -> &Attr<String> {
        &state.name
    }

    fn validate(desired: &TagState, _mode: WriteMode) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        require_string(&mut diagnostics, "name", &desired.name);
        diagnostics
    }

    fn encode(desired: &TagState, _resolved: &Resolved, mode: WriteMode) -> Result<serde_json::Value, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut payload = Payload::new();

        payload.optional_string("name", &desired.name);
        encode_slug(&mut payload, &desired.slug, &desired.name, mode);
        if let Attr::Value(color) = &desired.color {
            if !is_hex_color(color) {
                diagnostics.push_at(
                    "color",
                    ReconcileError::invalid("color", format!("{:?} is not a 6 digit hex color", color)),
                );
            }
        }
        if let Err(e) = payload.value("color", &desired.color) {
            diagnostics.push_at("color", e);
        }
        payload.optional_string("description", &desired.description);

        diagnostics.into_result(payload.into_value())
    }

    fn merge(local: &TagState, remote: Tag) -> Result<TagState, Diagnostics> {
        Ok(TagState {
            id: Attr::Value(remote.id),
            name: Attr::Value(remote.name),
            slug: Attr::Value(remote.slug),
            color: Attr::Value(remote.color),
            description: decode_optional_string(&local.description, remote.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_derives_slug() {
        let desired = TagState {
            name: Attr::Value("Core Net".to_string()),
            ..Default::default()
        };
        let payload = TagKind::encode(&desired, &Resolved::default(), WriteMode::Create).unwrap();
        assert_eq!(payload, json!({"name": "Core Net", "slug": "core-net"}));

        let payload = TagKind::encode(&desired, &Resolved::default(), WriteMode::Update).unwrap();
        assert_eq!(payload, json!({"name": "Core Net"}));
    }

    #[test]
    fn test_bad_color_is_reported() {
        let desired = TagState {
            name: Attr::Value("net".to_string()),
            color: Attr::Value("blue".to_string()),
            ..Default::default()
        };
        let diagnostics = TagKind::encode(&desired, &Resolved::default(), WriteMode::Create).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().attribute.as_deref(), Some("color"));
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(TagKind::validate(&TagState::default(), WriteMode::Create).len(), 1);
    }
}
