//! Integration tests for the NetBox gateway
//!
//! The wiremock tests exercise the HTTP client against a fake server.
//! The ignored tests require a running NetBox instance:
//! set NETBOX_URL and NETBOX_TOKEN environment variables to run them.

use netbox_client::{ClientConfig, NetBoxClient, NetBoxError, NetBoxGateway, ObjectKind};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NetBoxClient {
    NetBoxClient::new(server.uri(), "test-token".to_string()).expect("Failed to create client")
}

#[tokio::test]
async fn test_create_posts_payload_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dcim/regions/"))
        .and(header("Authorization", "Token test-token"))
        .and(body_json(json!({"name": "core", "slug": "core"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42, "url": "http://netbox/api/dcim/regions/42/", "name": "core", "slug": "core"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create(ObjectKind::Region, &json!({"name": "core", "slug": "core"}))
        .await
        .expect("create should succeed");
    assert_eq!(created["id"], 42);
}

#[tokio::test]
async fn test_retrieve_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/regions/42/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let err = client_for(&server).retrieve(ObjectKind::Region, 42).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[tokio::test]
async fn test_update_uses_patch_and_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/extras/tags/7/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"color\": [\"invalid\"]}"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .update(ObjectKind::Tag, 7, &json!({"color": "zzz"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("invalid"));
}

#[tokio::test]
async fn test_destroy_accepts_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/virtualization/cluster-types/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .destroy(ObjectKind::ClusterType, 5)
        .await
        .expect("delete should succeed");
}

#[tokio::test]
async fn test_list_follows_pagination() {
    let server = MockServer::start().await;
    let next = format!("{}/api/extras/tags/?name=a&name=b&offset=1", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/extras/tags/"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null,
            "results": [{"id": 2, "url": "u", "name": "b", "slug": "b"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/extras/tags/"))
        .and(query_param("name", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": next, "previous": null,
            "results": [{"id": 1, "url": "u", "name": "a", "slug": "a"}]
        })))
        .mount(&server)
        .await;

    let tags = client_for(&server)
        .list(ObjectKind::Tag, &[("name", "a"), ("name", "b")])
        .await
        .expect("list should succeed");
    let ids: Vec<u64> = tags.iter().filter_map(|t| t["id"].as_u64()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_invalid_token_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid token"))
        .mount(&server)
        .await;

    let err = client_for(&server).validate_token().await.unwrap_err();
    assert!(matches!(err, NetBoxError::Authentication(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/extras/tags/1/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = NetBoxClient::with_config(
        ClientConfig::new(server.uri(), "test-token").with_timeout(Duration::from_millis(100)),
    )
    .expect("Failed to create client");
    let err = client.retrieve(ObjectKind::Tag, 1).await.unwrap_err();
    assert!(matches!(err, NetBoxError::Http(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
#[ignore] // Requires running NetBox instance
async fn test_live_token_validation() {
    let url = std::env::var("NETBOX_URL")
        .unwrap_or_else(|_| "http://localhost:8001".to_string());
    let token = std::env::var("NETBOX_TOKEN")
        .expect("NETBOX_TOKEN environment variable must be set");

    let client = NetBoxClient::new(url, token).expect("Failed to create client");
    client.validate_token().await.expect("token should be valid");
}

#[tokio::test]
#[ignore] // Requires running NetBox instance
async fn test_live_tag_lifecycle() -> anyhow::Result<()> {
    let url = std::env::var("NETBOX_URL")
        .unwrap_or_else(|_| "http://localhost:8001".to_string());
    let token = std::env::var("NETBOX_TOKEN")?;

    let client = NetBoxClient::new(url, token)?;
    let created = client
        .create(ObjectKind::Tag, &json!({"name": "dcops-it", "slug": "dcops-it"}))
        .await?;
    let id = created["id"].as_u64().ok_or_else(|| anyhow::anyhow!("missing id"))?;

    let fetched = client.retrieve(ObjectKind::Tag, id).await?;
    assert_eq!(fetched["name"], "dcops-it");

    client.destroy(ObjectKind::Tag, id).await?;
    assert!(client.retrieve(ObjectKind::Tag, id).await.unwrap_err().is_not_found());
    Ok(())
}
