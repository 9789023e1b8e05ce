//! Webhook reconciliation (`extras/webhooks`)

use crate::codec::{dedupe, decode_optional_string, Payload};
use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::kind::{require_string, ResourceKind, WriteMode};
use crate::resolve::Resolved;
use netbox_client::{ObjectKind, Webhook};
use netbox_resources::{Attr, HttpMethod, WebhookState};
use std::collections::HashSet;

/// Webhooks
#[derive(Debug, Clone, Copy)]
pub struct WebhookKind;

fn event_enabled(attr: &Attr<bool>) -> bool {
    matches!(attr, Attr::Value(true))
}

/// Content types keep the local order when NetBox reports the same set
fn decode_content_types(local: &Attr<Vec<String>>, remote: Vec<String>) -> Vec<String> {
    if let Attr::Value(declared) = local {
        let declared = dedupe(declared);
        let same_set = declared.len() == remote.len()
            && declared.iter().collect::<HashSet<_>>() == remote.iter().collect::<HashSet<_>>();
        if same_set {
            return declared;
        }
    }
    remote
}

impl ResourceKind for WebhookKind {
    type State = WebhookState;
    type Remote = Webhook;

    const OBJECT_KIND: ObjectKind = ObjectKind::Webhook;

    fn id(state: &WebhookState) -> &Attr<u64> {
        &state.id
    }

    fn id_mut(state: &mut WebhookState) -> &mut Attr<u64> {
        &mut state.id
    }

    fn name(state: &WebhookState) -> &Attr<String> {
        &state.name
    }

    fn validate(desired: &WebhookState, _mode: WriteMode) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        require_string(&mut diagnostics, "name", &desired.name);
        require_string(&mut diagnostics, "payload_url", &desired.payload_url);
        if !desired.content_types.value().is_some_and(|types| !types.is_empty()) {
            diagnostics.push_at("content_types", ReconcileError::missing("content_types"));
        }
        diagnostics
    }

    fn encode(desired: &WebhookState, _resolved: &Resolved, mode: WriteMode) -> Result<serde_json::Value, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut payload = Payload::new();

        if let Attr::Value(url) = &desired.payload_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                diagnostics.push_at(
                    "payload_url",
                    ReconcileError::invalid("payload_url", "must be an http:// or https:// URL"),
                );
            }
        }
        if let Attr::Value(types) = &desired.content_types {
            for content_type in types.iter().filter(|t| !t.contains('.')) {
                diagnostics.push_at(
                    "content_types",
                    ReconcileError::invalid(
                        "content_types",
                        format!("{:?} is not of the form app_label.model", content_type),
                    ),
                );
            }
        }
        // On update an unknown flag keeps its remote value
        let events = [&desired.type_create, &desired.type_update, &desired.type_delete];
        let all_declared = events.iter().all(|event| matches!(event, Attr::Value(_)));
        let none_enabled = !events.iter().any(|event| event_enabled(event));
        if none_enabled && (mode == WriteMode::Create || all_declared) {
            diagnostics.push_at(
                "type_create",
                ReconcileError::invalid("type_create", "at least one of type_create, type_update or type_delete must be true"),
            );
        }

        payload.optional_string("name", &desired.name);
        payload.string_set("content_types", &desired.content_types);
        payload.optional_string("payload_url", &desired.payload_url);
        for (key, attr) in [
            ("enabled", &desired.enabled),
            ("type_create", &desired.type_create),
            ("type_update", &desired.type_update),
            ("type_delete", &desired.type_delete),
            ("ssl_verification", &desired.ssl_verification),
        ] {
            if let Err(e) = payload.value(key, attr) {
                diagnostics.push_at(key, e);
            }
        }
        if let Err(e) = payload.value("http_method", &desired.http_method) {
            diagnostics.push_at("http_method", e);
        }
        payload.optional_string("http_content_type", &desired.http_content_type);
        payload.optional_string("additional_headers", &desired.additional_headers);
        payload.optional_string("body_template", &desired.body_template);
        payload.optional_string("secret", &desired.secret);
        if let Err(e) = payload.nullable("ca_file_path", &desired.ca_file_path) {
            diagnostics.push_at("ca_file_path", e);
        }

        diagnostics.into_result(payload.into_value())
    }

    fn merge(local: &WebhookState, remote: Webhook) -> Result<WebhookState, Diagnostics> {
        let http_method = serde_json::from_value::<HttpMethod>(serde_json::Value::String(remote.http_method.clone()))
            .map_err(|_| {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push_at(
                    "http_method",
                    ReconcileError::Decode {
                        kind: ObjectKind::Webhook,
                        reason: format!("unsupported http_method {:?}", remote.http_method),
                    },
                );
                diagnostics
            })?;

        Ok(WebhookState {
            id: Attr::Value(remote.id),
            name: Attr::Value(remote.name),
            content_types: Attr::Value(decode_content_types(&local.content_types, remote.content_types)),
            payload_url: Attr::Value(remote.payload_url),
            enabled: Attr::Value(remote.enabled),
            type_create: Attr::Value(remote.type_create),
            type_update: Attr::Value(remote.type_update),
            type_delete: Attr::Value(remote.type_delete),
            http_method: Attr::Value(http_method),
            http_content_type: decode_optional_string(&local.http_content_type, remote.http_content_type),
            additional_headers: decode_optional_string(&local.additional_headers, remote.additional_headers),
            body_template: decode_optional_string(&local.body_template, remote.body_template),
            secret: decode_optional_string(&local.secret, remote.secret),
            ssl_verification: Attr::Value(remote.ssl_verification),
            ca_file_path: remote.ca_file_path.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desired() -> WebhookState {
        WebhookState {
            name: Attr::Value("inventory".to_string()),
            payload_url: Attr::Value("https://hooks.example.net/netbox".to_string()),
            content_types: Attr::Value(vec!["dcim.site".to_string(), "dcim.site".to_string()]),
            type_create: Attr::Value(true),
            http_method: Attr::Value(HttpMethod::Put),
            ca_file_path: Attr::Null,
            ..Default::default()
        }
    }

    #[test]
    fn test_encode() {
        let payload = WebhookKind::encode(&desired(), &Resolved::default(), WriteMode::Create).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "inventory",
                "content_types": ["dcim.site"],
                "payload_url": "https://hooks.example.net/netbox",
                "type_create": true,
                "http_method": "PUT",
                "ca_file_path": null,
            })
        );
    }

    #[test]
    fn test_invalid_fields_are_all_reported() {
        let webhook = WebhookState {
            payload_url: Attr::Value("hooks.example.net".to_string()),
            content_types: Attr::Value(vec!["site".to_string()]),
            type_create: Attr::Value(false),
            ..desired()
        };
        let diagnostics = WebhookKind::encode(&webhook, &Resolved::default(), WriteMode::Create).unwrap_err();
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_update_may_leave_events_unknown() {
        let webhook = WebhookState {
            name: Attr::Value("inventory-v2".to_string()),
            type_create: Attr::Unknown,
            ..desired()
        };
        let payload = WebhookKind::encode(&webhook, &Resolved::default(), WriteMode::Update).unwrap();
        assert_eq!(payload["name"], "inventory-v2");
        assert!(payload.get("type_create").is_none());

        assert!(WebhookKind::encode(&webhook, &Resolved::default(), WriteMode::Create).is_err());
    }

    #[test]
    fn test_update_disabling_every_event_is_rejected() {
        let webhook = WebhookState {
            type_create: Attr::Value(false),
            type_update: Attr::Value(false),
            type_delete: Attr::Value(false),
            ..desired()
        };
        let diagnostics = WebhookKind::encode(&webhook, &Resolved::default(), WriteMode::Update).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_requires_content_types() {
        let webhook = WebhookState {
            content_types: Attr::Value(Vec::new()),
            ..desired()
        };
        assert_eq!(WebhookKind::validate(&webhook, WriteMode::Create).len(), 1);
    }

    #[test]
    fn test_content_types_keep_local_order() {
        let local = Attr::Value(vec!["dcim.site".to_string(), "dcim.region".to_string()]);
        let decoded = decode_content_types(&local, vec!["dcim.region".to_string(), "dcim.site".to_string()]);
        assert_eq!(decoded, vec!["dcim.site".to_string(), "dcim.region".to_string()]);
    }

    #[test]
    fn test_merge_rejects_unknown_method() {
        let remote: Webhook = serde_json::from_value(json!({
            "id": 1, "url": "", "name": "inventory", "payload_url": "https://x", "http_method": "TRACE",
        }))
        .unwrap();
        assert!(WebhookKind::merge(&desired(), remote).is_err());
    }
}
