//! Reference resolution
//!
//! Resolution runs in two phases. First every name reference the operation
//! needs is fetched with one list call per object kind. Names that match no
//! object by name are retried as slugs in one more list call for that kind.
//! Then each reference is bound to exactly one of the fetched objects, by name
//! first and by slug otherwise. Id references pass through without a lookup.

use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::reconcile_helpers::cancellable;
use netbox_client::{NetBoxGateway, ObjectKind};
use netbox_resources::Reference;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// References one attribute needs resolved against one object kind
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    /// Payload attribute the ids are written to
    pub attribute: &'static str,
    /// Kind the references point at
    pub kind: ObjectKind,
    /// References in declaration order
    pub refs: Vec<Reference>,
}

impl ReferenceSet {
    pub fn new(attribute: &'static str, kind: ObjectKind, refs: Vec<Reference>) -> Self {
        Self { attribute, kind, refs }
    }
}

/// Resolved ids per attribute, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    ids: HashMap<&'static str, Vec<u64>>,
}

impl Resolved {
    /// Ids resolved for `attribute`, empty when none were
    pub fn ids(&self, attribute: &str) -> &[u64] {
        self.ids.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record the ids of one attribute
    pub fn insert(&mut self, attribute: &'static str, ids: Vec<u64>) {
        self.ids.insert(attribute, ids);
    }
}

/// Minimal view of a listed object used for binding
#[derive(Debug, Deserialize)]
struct Candidate {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
}

impl Candidate {
    fn matching<'a>(candidates: &'a [Candidate], name: &str) -> Vec<&'a Candidate> {
        let by_name: Vec<&Candidate> = candidates.iter().filter(|c| c.name == name).collect();
        if !by_name.is_empty() {
            return by_name;
        }
        candidates.iter().filter(|c| c.slug == name).collect()
    }
}

/// List one kind filtered by repeated `key=value` pairs
async fn fetch(
    gateway: &dyn NetBoxGateway,
    kind: ObjectKind,
    key: &str,
    values: &[&str],
    cancel: &CancellationToken,
) -> Result<Vec<Candidate>, ReconcileError> {
    let filters: Vec<(&str, &str)> = values.iter().map(|value| (key, *value)).collect();
    debug!("Looking up {} {} reference(s) by {} in one call", values.len(), kind, key);
    let objects = cancellable(cancel, gateway.list(kind, &filters)).await?;
    objects
        .into_iter()
        .map(serde_json::from_value::<Candidate>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReconcileError::Decode {
            kind,
            reason: e.to_string(),
        })
}

/// Human readable form of a filter set, e.g. `name=net, slug=net`
pub fn describe_filters(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind a lookup to its single match.
///
/// Zero matches is a no-result error and more than one is ambiguous.
pub fn bind_unique<T>(kind: ObjectKind, filter: &str, mut matches: Vec<T>) -> Result<T, ReconcileError> {
    match matches.len() {
        0 => Err(ReconcileError::NoResult {
            kind,
            filter: filter.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(ReconcileError::Ambiguous {
            kind,
            filter: filter.to_string(),
            count,
        }),
    }
}

/// Resolve every reference set, reporting all failures together
pub async fn resolve_references(
    gateway: &dyn NetBoxGateway,
    sets: &[ReferenceSet],
    cancel: &CancellationToken,
) -> Result<Resolved, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    // Phase 1: one batched list call per kind, and one more for names found only as slugs
    let mut wanted: BTreeMap<ObjectKind, Vec<&str>> = BTreeMap::new();
    for set in sets {
        for reference in &set.refs {
            if let Reference::Name(name) = reference {
                let names = wanted.entry(set.kind).or_default();
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
    }

    let mut fetched: HashMap<ObjectKind, Vec<Candidate>> = HashMap::new();
    for (kind, names) in &wanted {
        let mut candidates = match fetch(gateway, *kind, "name", names, cancel).await {
            Ok(candidates) => candidates,
            Err(ReconcileError::Cancelled) => return Err(ReconcileError::Cancelled.into()),
            Err(e) => {
                diagnostics.push(e);
                continue;
            }
        };

        let unmatched: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !candidates.iter().any(|c| c.name == *name))
            .collect();
        if !unmatched.is_empty() && kind.has_slug() {
            match fetch(gateway, *kind, "slug", &unmatched, cancel).await {
                Ok(by_slug) => {
                    for candidate in by_slug {
                        if !candidates.iter().any(|c| c.id == candidate.id) {
                            candidates.push(candidate);
                        }
                    }
                }
                Err(ReconcileError::Cancelled) => return Err(ReconcileError::Cancelled.into()),
                Err(e) => {
                    diagnostics.push(e);
                    continue;
                }
            }
        }
        fetched.insert(*kind, candidates);
    }

    // Phase 2: bind each reference
    let mut resolved = Resolved::default();
    for set in sets {
        let mut ids = Vec::with_capacity(set.refs.len());
        for reference in &set.refs {
            match reference {
                Reference::Id(id) => ids.push(*id),
                Reference::Name(name) => {
                    // A failed fetch was already reported above
                    let Some(candidates) = fetched.get(&set.kind) else {
                        continue;
                    };
                    let matches: Vec<u64> = Candidate::matching(candidates, name).iter().map(|c| c.id).collect();
                    let mut filter = describe_filters(&[("name", name.as_str())]);
                    if set.kind.has_slug() {
                        filter.push_str(&format!(" or slug={}", name));
                    }
                    match bind_unique(set.kind, &filter, matches) {
                        Ok(id) => ids.push(id),
                        Err(e) => diagnostics.push_at(set.attribute, e),
                    }
                }
            }
        }
        resolved.insert(set.attribute, ids);
    }

    diagnostics.into_result(resolved)
}

/// Id of a listed object, used when binding a data-source lookup
pub(crate) fn listed_id(kind: ObjectKind, object: &Value) -> Result<u64, ReconcileError> {
    object.get("id").and_then(Value::as_u64).ok_or_else(|| ReconcileError::Decode {
        kind,
        reason: "listed object has no id".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbox_client::MockNetBoxClient;

    #[test]
    fn test_bind_unique() {
        assert_eq!(bind_unique(ObjectKind::Tag, "name=a", vec![4]).unwrap(), 4);
        assert!(matches!(
            bind_unique::<u64>(ObjectKind::Tag, "name=a", vec![]),
            Err(ReconcileError::NoResult { .. })
        ));
        assert!(matches!(
            bind_unique(ObjectKind::Tag, "name=a", vec![1, 2]),
            Err(ReconcileError::Ambiguous { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_names_are_fetched_in_one_call() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.add_tag(7, "net");
        mock.add_tag(9, "edge");
        let sets = vec![ReferenceSet::new(
            "tags",
            ObjectKind::Tag,
            vec!["edge".into(), Reference::Id(12), "net".into(), "edge".into()],
        )];

        let resolved = resolve_references(&mock, &sets, &CancellationToken::new()).await.unwrap();

        assert_eq!(resolved.ids("tags"), &[9, 12, 7, 9]);
        let lists = mock.calls_to("LIST");
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].filters.len(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_names_fall_back_to_slugs() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.add_tag(7, "net");
        mock.insert(ObjectKind::Tag, 5, serde_json::json!({"name": "Core Net", "slug": "core-net"}));
        let sets = vec![ReferenceSet::new(
            "tags",
            ObjectKind::Tag,
            vec!["net".into(), "core-net".into()],
        )];

        let resolved = resolve_references(&mock, &sets, &CancellationToken::new()).await.unwrap();

        assert_eq!(resolved.ids("tags"), &[7, 5]);
        let lists = mock.calls_to("LIST");
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[1].filters, vec![("slug".to_string(), "core-net".to_string())]);
    }

    #[tokio::test]
    async fn test_name_match_wins_over_slug() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.insert(ObjectKind::Tag, 1, serde_json::json!({"name": "edge", "slug": "edge-1"}));
        mock.insert(ObjectKind::Tag, 2, serde_json::json!({"name": "Edge Sites", "slug": "edge"}));
        let sets = vec![ReferenceSet::new("tags", ObjectKind::Tag, vec!["edge".into()])];

        let resolved = resolve_references(&mock, &sets, &CancellationToken::new()).await.unwrap();

        assert_eq!(resolved.ids("tags"), &[1]);
        assert_eq!(mock.calls_to("LIST").len(), 1);
    }

    #[tokio::test]
    async fn test_id_references_skip_lookup() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        let sets = vec![ReferenceSet::new("tags", ObjectKind::Tag, vec![Reference::Id(3)])];

        let resolved = resolve_references(&mock, &sets, &CancellationToken::new()).await.unwrap();

        assert_eq!(resolved.ids("tags"), &[3]);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_every_failure_is_reported() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.add_tag(1, "dup");
        mock.add_tag(2, "dup");
        let sets = vec![ReferenceSet::new(
            "tags",
            ObjectKind::Tag,
            vec!["dup".into(), "missing".into()],
        )];

        let diagnostics = resolve_references(&mock, &sets, &CancellationToken::new()).await.unwrap_err();

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.any(|e| matches!(e, ReconcileError::Ambiguous { .. })));
        assert!(diagnostics.any(|e| matches!(e, ReconcileError::NoResult { .. })));
        assert!(diagnostics.iter().all(|d| d.attribute.as_deref() == Some("tags")));
    }
}
