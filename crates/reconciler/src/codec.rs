//! Field codec: local attribute state to NetBox payload fields and back
//!
//! Encoding builds a JSON payload through [`Payload`]. Unknown attributes are
//! never written. Decoding helpers take the remote value together with the
//! local attribute, because several fields only survive a round trip when the
//! local intent is used to interpret the remote answer.

use crate::error::ReconcileError;
use crate::resolve::Resolved;
use netbox_client::{NestedTag, ObjectKind};
use netbox_resources::{Attr, CustomFieldMap, Reference};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Derive a slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Remove repeated entries, keeping the first occurrence of each
pub fn dedupe<T: Clone + Eq + std::hash::Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items.iter().filter(|item| seen.insert(*item)).cloned().collect()
}

/// Tag references as NetBox returns them: always ids, in remote order
pub fn decode_tags(remote: &[NestedTag]) -> Vec<Reference> {
    remote.iter().map(|tag| Reference::Id(tag.id)).collect()
}

/// Nullable reference from the remote nested object id
pub fn decode_reference(remote: Option<u64>) -> Attr<Reference> {
    match remote {
        Some(id) => Attr::Value(Reference::Id(id)),
        None => Attr::Null,
    }
}

/// Optional string NetBox stores as `""` when unset.
///
/// A remote empty string is null unless the local side asked for `""`.
pub fn decode_optional_string(local: &Attr<String>, remote: String) -> Attr<String> {
    if !remote.is_empty() {
        return Attr::Value(remote);
    }
    match local {
        Attr::Value(s) if s.is_empty() => Attr::Value(String::new()),
        _ => Attr::Null,
    }
}

/// Decode one remote custom-field value. Scalars become strings.
fn custom_field_value(name: &str, value: &Value) -> Result<Option<String>, ReconcileError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ReconcileError::invalid(
            &format!("custom_fields.{}", name),
            "only scalar custom field values are supported",
        )),
    }
}

/// Merge the remote custom-field map into the local one.
///
/// An unknown, null or empty local map adopts the whole remote map. Otherwise
/// only the locally declared keys are kept: each takes the remote value when
/// NetBox reports the key and keeps the local value when it does not.
pub fn merge_custom_fields(
    local: &Attr<CustomFieldMap>,
    remote: &Map<String, Value>,
) -> Result<CustomFieldMap, ReconcileError> {
    match local.value() {
        Some(declared) if !declared.is_empty() => declared
            .iter()
            .map(|(name, local_value)| {
                let value = match remote.get(name) {
                    Some(remote_value) => custom_field_value(name, remote_value)?,
                    None => local_value.clone(),
                };
                Ok((name.clone(), value))
            })
            .collect(),
        _ => remote
            .iter()
            .map(|(name, value)| Ok((name.clone(), custom_field_value(name, value)?)))
            .collect(),
    }
}

/// Payload under construction for one write
#[derive(Debug, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished payload as a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Fields set so far
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Unknown is omitted; null is sent as JSON null
    pub fn nullable<T: serde::Serialize>(&mut self, key: &str, attr: &Attr<T>) -> Result<(), ReconcileError> {
        match attr {
            Attr::Unknown => {}
            Attr::Null => {
                self.fields.insert(key.to_string(), Value::Null);
            }
            Attr::Value(v) => {
                let value = serde_json::to_value(v).map_err(|e| ReconcileError::invalid(key, e.to_string()))?;
                self.fields.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Unknown and null are both omitted
    pub fn value<T: serde::Serialize>(&mut self, key: &str, attr: &Attr<T>) -> Result<(), ReconcileError> {
        match attr {
            Attr::Value(_) => self.nullable(key, attr),
            _ => Ok(()),
        }
    }

    /// String NetBox stores as `""` when unset: null is sent as `""`
    pub fn optional_string(&mut self, key: &str, attr: &Attr<String>) {
        match attr {
            Attr::Unknown => {}
            Attr::Null => {
                self.fields.insert(key.to_string(), Value::String(String::new()));
            }
            Attr::Value(s) => {
                self.fields.insert(key.to_string(), Value::String(s.clone()));
            }
        }
    }

    /// String set: repeated entries are dropped, first occurrence order kept
    pub fn string_set(&mut self, key: &str, attr: &Attr<Vec<String>>) {
        if let Attr::Value(items) = attr {
            let items = dedupe(items).into_iter().map(Value::String).collect();
            self.fields.insert(key.to_string(), Value::Array(items));
        }
    }

    /// Resolved nullable reference: unknown omitted, null sent as null, value sent as the id
    pub fn reference(&mut self, key: &str, attr: &Attr<Reference>, resolved: &Resolved) {
        match attr {
            Attr::Unknown => {}
            Attr::Null => {
                self.fields.insert(key.to_string(), Value::Null);
            }
            Attr::Value(_) => {
                if let Some(&id) = resolved.ids(key).first() {
                    self.fields.insert(key.to_string(), Value::from(id));
                }
            }
        }
    }

    /// Resolved tag set as `[{"id": n}, ...]`; null clears every tag
    pub fn tags(&mut self, attr: &Attr<Vec<Reference>>, resolved: &Resolved) {
        let ids: &[u64] = match attr {
            Attr::Unknown => return,
            Attr::Null => &[],
            Attr::Value(_) => resolved.ids("tags"),
        };
        let tags = dedupe(ids)
            .into_iter()
            .map(|id| serde_json::json!({ "id": id }))
            .collect();
        self.fields.insert("tags".to_string(), Value::Array(tags));
    }

    /// Custom fields: each declared key is sent, a `None` value as null
    pub fn custom_fields(&mut self, attr: &Attr<CustomFieldMap>) -> Result<(), ReconcileError> {
        let Attr::Value(map) = attr else {
            return Ok(());
        };
        let mut encoded = Map::new();
        for (name, value) in map {
            if name.trim().is_empty() {
                return Err(ReconcileError::invalid(
                    "custom_fields",
                    "custom field names may not be empty",
                ));
            }
            let value = value.clone().map_or(Value::Null, Value::String);
            encoded.insert(name.clone(), value);
        }
        self.fields.insert("custom_fields".to_string(), Value::Object(encoded));
        Ok(())
    }
}

/// Whether the `current` payload already carries every field `wanted` sets.
///
/// Objects match on the keys `wanted` names, a missing key standing for null.
/// Arrays match as sets.
pub fn payload_covers(wanted: &Value, current: &Value) -> bool {
    match (wanted, current) {
        (Value::Object(wanted), Value::Object(current)) => wanted.iter().all(|(key, value)| match current.get(key) {
            Some(current) => payload_covers(value, current),
            None => value.is_null(),
        }),
        (Value::Array(wanted), Value::Array(current)) => {
            wanted.len() == current.len() && wanted.iter().all(|w| current.iter().any(|c| payload_covers(w, c)))
        }
        _ => wanted == current,
    }
}

/// Strictly decode a remote payload into its typed model
pub fn decode_remote<T: serde::de::DeserializeOwned>(kind: ObjectKind, value: Value) -> Result<T, ReconcileError> {
    serde_json::from_value(value).map_err(|e| ReconcileError::Decode {
        kind,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested(id: u64, name: &str) -> NestedTag {
        serde_json::from_value(json!({"id": id, "name": name})).unwrap()
    }

    fn fields(pairs: &[(&str, Option<&str>)]) -> CustomFieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Core Network"), "core-network");
        assert_eq!(slugify("  EU / West  "), "eu-west");
        assert_eq!(slugify("rack_01"), "rack_01");
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        assert_eq!(dedupe(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_tags_decode_as_ids_in_remote_order() {
        let decoded = decode_tags(&[nested(9, "edge"), nested(7, "net")]);
        assert_eq!(decoded, vec![Reference::Id(9), Reference::Id(7)]);
    }

    #[test]
    fn test_tag_names_round_trip_to_ids() {
        let mut resolved = Resolved::default();
        resolved.insert("tags", vec![7, 9]);
        let mut payload = Payload::new();
        payload.tags(&Attr::Value(vec!["net".into(), "edge".into()]), &resolved);

        assert_eq!(payload.fields()["tags"], json!([{"id": 7}, {"id": 9}]));
        let remote = [nested(7, "net"), nested(9, "edge")];
        assert_eq!(decode_tags(&remote), vec![Reference::Id(7), Reference::Id(9)]);
    }

    #[test]
    fn test_null_tags_clear_and_unknown_tags_are_omitted() {
        let mut payload = Payload::new();
        payload.tags(&Attr::Unknown, &Resolved::default());
        assert!(payload.fields().get("tags").is_none());
        payload.tags(&Attr::Null, &Resolved::default());
        assert_eq!(payload.fields()["tags"], json!([]));
    }

    #[test]
    fn test_merge_keeps_only_declared_keys() {
        let local = Attr::Value(fields(&[("owner", Some("ops")), ("ticket", None)]));
        let remote = json!({"owner": "netops", "ticket": 1234, "unmanaged": "x"});
        let merged = merge_custom_fields(&local, remote.as_object().unwrap()).unwrap();

        assert_eq!(merged, fields(&[("owner", Some("netops")), ("ticket", Some("1234"))]));
    }

    #[test]
    fn test_merge_keeps_local_value_for_keys_missing_remotely() {
        let local = Attr::Value(fields(&[("owner", Some("ops"))]));
        let merged = merge_custom_fields(&local, &Map::new()).unwrap();
        assert_eq!(merged, fields(&[("owner", Some("ops"))]));
    }

    #[test]
    fn test_merge_adopts_remote_map_when_local_is_empty() {
        let remote = json!({"owner": "netops", "ticket": null});
        let expected = fields(&[("owner", Some("netops")), ("ticket", None)]);
        for local in [Attr::Unknown, Attr::Null, Attr::Value(CustomFieldMap::new())] {
            let merged = merge_custom_fields(&local, remote.as_object().unwrap()).unwrap();
            assert_eq!(merged, expected);
        }
    }

    #[test]
    fn test_merge_rejects_structured_values() {
        let remote = json!({"owner": ["a", "b"]});
        let err = merge_custom_fields(&Attr::Unknown, remote.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, ReconcileError::Invalid { .. }));
    }

    #[test]
    fn test_custom_fields_encode_none_as_null() {
        let mut payload = Payload::new();
        payload
            .custom_fields(&Attr::Value(fields(&[("owner", Some("ops")), ("ticket", None)])))
            .unwrap();
        assert_eq!(payload.fields()["custom_fields"], json!({"owner": "ops", "ticket": null}));
    }

    #[test]
    fn test_custom_fields_reject_empty_name() {
        let mut payload = Payload::new();
        let err = payload.custom_fields(&Attr::Value(fields(&[(" ", None)]))).unwrap_err();
        assert!(matches!(err, ReconcileError::Invalid { .. }));
    }

    #[test]
    fn test_reference_encoding() {
        let mut resolved = Resolved::default();
        resolved.insert("parent", vec![3]);

        let mut payload = Payload::new();
        payload.reference("parent", &Attr::Unknown, &resolved);
        assert!(payload.fields().get("parent").is_none());

        payload.reference("parent", &Attr::Null, &resolved);
        assert_eq!(payload.fields()["parent"], Value::Null);

        payload.reference("parent", &Attr::Value(Reference::from("europe")), &resolved);
        assert_eq!(payload.fields()["parent"], json!(3));
    }

    #[test]
    fn test_reference_decoding() {
        assert_eq!(decode_reference(Some(3)), Attr::Value(Reference::Id(3)));
        assert_eq!(decode_reference(None), Attr::Null);
    }

    #[test]
    fn test_optional_string_codec() {
        let mut payload = Payload::new();
        payload.optional_string("description", &Attr::Null);
        assert_eq!(payload.fields()["description"], json!(""));

        assert_eq!(decode_optional_string(&Attr::Unknown, String::new()), Attr::Null);
        assert_eq!(
            decode_optional_string(&Attr::Value(String::new()), String::new()),
            Attr::Value(String::new())
        );
        assert_eq!(
            decode_optional_string(&Attr::Null, "core".to_string()),
            Attr::Value("core".to_string())
        );
    }

    #[test]
    fn test_string_set_dedupes() {
        let mut payload = Payload::new();
        payload.string_set(
            "content_types",
            &Attr::Value(vec!["dcim.site".into(), "dcim.region".into(), "dcim.site".into()]),
        );
        assert_eq!(payload.fields()["content_types"], json!(["dcim.site", "dcim.region"]));
    }

    #[test]
    fn test_payload_covers_declared_fields() {
        let current = json!({
            "name": "core",
            "description": "",
            "tags": [{"id": 9}, {"id": 7}],
            "custom_fields": {"owner": "ops", "rack": "r1"},
        });
        assert!(payload_covers(&json!({"tags": [{"id": 7}, {"id": 9}]}), &current));
        assert!(payload_covers(&json!({"custom_fields": {"owner": "ops"}, "parent": null}), &current));
        assert!(!payload_covers(&json!({"description": "managed"}), &current));
        assert!(!payload_covers(&json!({"tags": [{"id": 7}]}), &current));
        assert!(!payload_covers(&json!({"custom_fields": {"owner": "netops"}}), &current));
    }
}
