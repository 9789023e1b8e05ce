//! Helper functions for the mock store: defaults, payload application and rendering

use crate::error::NetBoxError;
use crate::kind::ObjectKind;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Derive a slug the way NetBox's UI does for simple names
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Server-side defaults for a freshly created object
pub fn defaults(kind: ObjectKind) -> Value {
    match kind {
        ObjectKind::Tag => json!({
            "name": "", "slug": "", "color": "9e9e9e", "description": "",
        }),
        ObjectKind::Region => json!({
            "name": "", "slug": "", "parent": null, "description": "", "tags": [], "custom_fields": {},
        }),
        ObjectKind::ClusterType => json!({
            "name": "", "slug": "", "description": "", "tags": [], "custom_fields": {},
        }),
        ObjectKind::Webhook => json!({
            "name": "", "content_types": [], "type_create": false, "type_update": false,
            "type_delete": false, "payload_url": "", "enabled": true, "http_method": "POST",
            "http_content_type": "application/json", "additional_headers": "", "body_template": "",
            "secret": "", "ssl_verification": true, "ca_file_path": null,
        }),
    }
}

/// Tag ids from a payload accepting either `[7]` or `[{"id": 7}]`
fn tag_ids(tags: &Value) -> Vec<u64> {
    tags.as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_u64().or_else(|| t.get("id").and_then(Value::as_u64)))
                .collect()
        })
        .unwrap_or_default()
}

/// Merge payload fields into a stored object (PATCH semantics)
pub fn apply_payload(object: &mut Value, payload: &Value) {
    let (Some(object), Some(payload)) = (object.as_object_mut(), payload.as_object()) else {
        return;
    };
    for (key, value) in payload {
        match key.as_str() {
            "id" | "url" | "display" => {}
            "tags" => {
                object.insert(key.clone(), json!(tag_ids(value)));
            }
            "custom_fields" => {
                let stored = object
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let (Some(stored), Some(incoming)) = (stored.as_object_mut(), value.as_object()) {
                    for (name, field) in incoming {
                        stored.insert(name.clone(), field.clone());
                    }
                }
            }
            _ => {
                object.insert(key.clone(), value.clone());
            }
        }
    }
}

fn bad_request(message: String) -> NetBoxError {
    NetBoxError::Api { status: 400, message }
}

/// Reject payloads NetBox's serializers would refuse
pub fn validate_payload(kind: ObjectKind, payload: &Value, creating: bool) -> Result<(), NetBoxError> {
    let Some(fields) = payload.as_object() else {
        return Err(bad_request("payload must be a JSON object".to_string()));
    };
    let mut required = vec!["name"];
    match kind {
        ObjectKind::Tag | ObjectKind::Region | ObjectKind::ClusterType => required.push("slug"),
        ObjectKind::Webhook => required.extend(["payload_url", "content_types"]),
    }
    for field in required {
        match fields.get(field) {
            None if creating => {
                return Err(bad_request(format!("{}: This field is required.", field)));
            }
            Some(Value::Null) => {
                return Err(bad_request(format!("{}: This field may not be null.", field)));
            }
            Some(Value::String(s)) if s.is_empty() => {
                return Err(bad_request(format!("{}: This field may not be blank.", field)));
            }
            Some(Value::Array(a)) if a.is_empty() => {
                return Err(bad_request(format!("{}: This list may not be empty.", field)));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Reject payloads pointing at tags or parent regions that do not exist
pub fn check_references(objects: &HashMap<ObjectKind, BTreeMap<u64, Value>>, payload: &Value) -> Result<(), NetBoxError> {
    let exists = |kind: ObjectKind, id: u64| objects.get(&kind).is_some_and(|o| o.contains_key(&id));

    if let Some(tags) = payload.get("tags") {
        for id in tag_ids(tags) {
            if !exists(ObjectKind::Tag, id) {
                return Err(bad_request(format!("tags: Related object {} does not exist.", id)));
            }
        }
    }
    if let Some(parent) = payload.get("parent").and_then(Value::as_u64) {
        if !exists(ObjectKind::Region, parent) {
            return Err(bad_request(format!("parent: Related object {} does not exist.", parent)));
        }
    }
    Ok(())
}

/// Object as returned by the API: identity fields plus nested references
pub fn render(
    base_url: &str,
    objects: &HashMap<ObjectKind, BTreeMap<u64, Value>>,
    kind: ObjectKind,
    id: u64,
    raw: &Value,
    defined_custom_fields: &[String],
) -> Value {
    let mut out = raw.clone();
    let Some(fields) = out.as_object_mut() else {
        return out;
    };
    let name = fields.get("name").cloned().unwrap_or(Value::Null);
    fields.insert("id".to_string(), json!(id));
    fields.insert("url".to_string(), json!(format!("{}{}", base_url, kind.object_path(id))));
    fields.insert("display".to_string(), name);

    if let Some(tags) = fields.get("tags").cloned() {
        let nested: Vec<Value> = tag_ids(&tags)
            .into_iter()
            .filter_map(|tag_id| {
                objects.get(&ObjectKind::Tag)?.get(&tag_id).map(|tag| {
                    json!({
                        "id": tag_id,
                        "url": format!("{}{}", base_url, ObjectKind::Tag.object_path(tag_id)),
                        "display": tag["name"],
                        "name": tag["name"],
                        "slug": tag["slug"],
                        "color": tag["color"],
                    })
                })
            })
            .collect();
        fields.insert("tags".to_string(), Value::Array(nested));
    }

    if let Some(parent_id) = fields.get("parent").and_then(Value::as_u64) {
        let nested = objects
            .get(&ObjectKind::Region)
            .and_then(|regions| regions.get(&parent_id))
            .map_or(Value::Null, |parent| {
                json!({
                    "id": parent_id,
                    "url": format!("{}{}", base_url, ObjectKind::Region.object_path(parent_id)),
                    "display": parent["name"],
                    "name": parent["name"],
                    "slug": parent["slug"],
                    "_depth": 0,
                })
            });
        fields.insert("parent".to_string(), nested);
    }

    if let Some(custom) = fields.get_mut("custom_fields").and_then(Value::as_object_mut) {
        for name in defined_custom_fields {
            custom.entry(name.clone()).or_insert(Value::Null);
        }
    }

    out
}

fn field_as_string(id: u64, raw: &Value, key: &str) -> Option<String> {
    if key == "id" {
        return Some(id.to_string());
    }
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Exact-match filtering; values for a repeated key are ORed, distinct keys are ANDed
pub fn matches_filters(id: u64, raw: &Value, filters: &[(&str, &str)]) -> bool {
    let mut by_key: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &(key, value) in filters {
        by_key.entry(key).or_default().push(value);
    }
    by_key.iter().all(|(key, values)| {
        field_as_string(id, raw, key).is_some_and(|actual| values.iter().any(|v| *v == actual))
    })
}
