//! Single-object lookup by filter

use crate::codec::decode_remote;
use crate::diagnostics::Diagnostics;
use crate::kind::ResourceKind;
use crate::reconcile_helpers::cancellable;
use crate::resolve::{bind_unique, describe_filters, listed_id};
use netbox_client::NetBoxGateway;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Find exactly one object of kind `K` matching `filters`.
///
/// Zero matches and more than one match are both errors. The match is decoded
/// with no local intent, so every custom field NetBox reports is kept.
pub async fn lookup_one<K: ResourceKind>(
    gateway: &dyn NetBoxGateway,
    filters: &[(&str, &str)],
    cancel: &CancellationToken,
) -> Result<K::State, Diagnostics> {
    let filter = describe_filters(filters);
    debug!("Looking up {} matching {}", K::OBJECT_KIND, filter);

    let matches = cancellable(cancel, gateway.list(K::OBJECT_KIND, filters)).await?;
    let found = bind_unique(K::OBJECT_KIND, &filter, matches)?;
    debug!("Found {} (ID: {})", K::OBJECT_KIND, listed_id(K::OBJECT_KIND, &found)?);

    let remote: K::Remote = decode_remote(K::OBJECT_KIND, found)?;
    K::merge(&K::State::default(), remote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;
    use crate::kinds::{RegionKind, TagKind};
    use netbox_client::MockNetBoxClient;
    use netbox_resources::Attr;

    #[tokio::test]
    async fn test_lookup_single_match() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.add_tag(7, "net");
        mock.add_tag(8, "edge");

        let tag = lookup_one::<TagKind>(&mock, &[("name", "net")], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tag.id, Attr::Value(7));
        assert_eq!(tag.slug, Attr::Value("net".to_string()));
    }

    #[tokio::test]
    async fn test_lookup_ambiguous_is_rejected() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.add_region(1, "core", None);
        mock.add_region(2, "core", Some(1));

        let err = lookup_one::<RegionKind>(&mock, &[("name", "core")], &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.any(|e| matches!(e, ReconcileError::Ambiguous { count: 2, .. })));
        assert!(err.to_string().contains("specify a more narrow filter"));
    }

    #[tokio::test]
    async fn test_lookup_no_result() {
        let mock = MockNetBoxClient::new("http://test-netbox");

        let err = lookup_one::<TagKind>(&mock, &[("slug", "missing")], &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.any(|e| matches!(e, ReconcileError::NoResult { .. })));
    }

    #[tokio::test]
    async fn test_lookup_adopts_every_custom_field() {
        let mock = MockNetBoxClient::new("http://test-netbox");
        mock.define_custom_field(netbox_client::ObjectKind::Region, "owner");
        mock.add_region(1, "core", None);

        let region = lookup_one::<RegionKind>(&mock, &[("id", "1")], &CancellationToken::new())
            .await
            .unwrap();

        let fields = region.custom_fields.value().unwrap();
        assert_eq!(fields.get("owner"), Some(&None));
    }
}
