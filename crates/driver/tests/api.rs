//! HTTP surface tests for the lifecycle operations

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use ::common::iam::IdentityDocument;
use ::common::provisioner::{
    CreateBucketResponse, GrantAccessResponse, ProvisionerConfig, RevokeScope,
};
use ::common::store::DirectoryStore;
use cosi_driver::http_server::api::v0::ErrorBody;

async fn read_document(store: &::common::testkit::FaultyStore) -> Option<IdentityDocument> {
    store
        .inner()
        .lookup("/etc/iam", "identity.json")
        .await
        .unwrap()
        .map(|entry| IdentityDocument::decode(&entry.content).unwrap())
}

#[tokio::test]
async fn test_create_bucket() {
    let (router, store) = common::setup_router();

    let (status, body) =
        common::post_json(&router, "/api/v0/bucket", &json!({"name": "b1"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let response: CreateBucketResponse = common::parse(&body);
    assert_eq!(response.bucket_id, "b1");

    // Repeating the call is success
    let (status, _) = common::post_json(&router, "/api/v0/bucket", &json!({"name": "b1"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(store.inner().lookup("/buckets", "b1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_bucket_invalid_name() {
    let (router, _store) = common::setup_router();

    let (status, body) = common::post_json(&router, "/api/v0/bucket", &json!({"name": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = common::parse(&body);
    assert_eq!(error.code, "InvalidArgument");
}

#[tokio::test]
async fn test_create_bucket_missing_field_rejected() {
    let (router, store) = common::setup_router();

    let (status, _) = common::post_json(&router, "/api/v0/bucket", &json!({})).await;
    assert!(status.is_client_error());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_create_bucket_backend_down() {
    let (router, store) = common::setup_router();
    store.fail_writes(1);

    let (status, body) = common::post_json(&router, "/api/v0/bucket", &json!({"name": "b1"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorBody = common::parse(&body);
    assert_eq!(error.code, "Unavailable");
}

#[tokio::test]
async fn test_delete_bucket() {
    let (router, store) = common::setup_router();
    common::post_json(&router, "/api/v0/bucket", &json!({"name": "b1"})).await;

    let (status, body) =
        common::post_json(&router, "/api/v0/bucket/delete", &json!({"bucket_id": "b1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::parse::<Value>(&body), json!({}));
    assert!(store.inner().lookup("/buckets", "b1").await.unwrap().is_none());

    // Already gone is still success
    let (status, _) =
        common::post_json(&router, "/api/v0/bucket/delete", &json!({"bucket_id": "b1"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_grant_access_returns_s3_credentials() {
    let (router, store) = common::setup_router();

    let (status, body) = common::post_json(
        &router,
        "/api/v0/access/grant",
        &json!({"bucket_id": "b1", "account_name": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Wire names follow the credentials map handed to workloads
    let raw: Value = common::parse(&body);
    assert_eq!(raw["account_id"], "alice");
    assert_eq!(raw["credentials"]["s3"]["endpoint"], common::ENDPOINT);
    assert_eq!(raw["credentials"]["s3"]["region"], common::REGION);
    assert!(raw["credentials"]["s3"]["accessKeyID"].is_string());
    assert!(raw["credentials"]["s3"]["accessSecretKey"].is_string());

    let response: GrantAccessResponse = common::parse(&body);
    let s3 = response.s3().unwrap();
    let doc = read_document(&store).await.unwrap();
    let alice = doc.identity("alice").unwrap();
    assert!(alice.credentials.iter().any(|c| c.access_key == s3.access_key_id));
    assert!(alice.has_action("Tagging:b1"));
}

#[tokio::test]
async fn test_grant_access_malformed_document() {
    let (router, store) = common::setup_router();
    store
        .inner()
        .create("/etc/iam", "identity.json", bytes_of("not json"))
        .await
        .unwrap();

    let (status, body) = common::post_json(
        &router,
        "/api/v0/access/grant",
        &json!({"bucket_id": "b1", "account_name": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorBody = common::parse(&body);
    assert_eq!(error.code, "Internal");
}

#[tokio::test]
async fn test_grant_access_conflict_exhausted() {
    let (router, store) = common::setup_router_with_config(ProvisionerConfig {
        max_attempts: 1,
        ..common::test_config()
    });
    store.conflict_updates(1);

    let (status, body) = common::post_json(
        &router,
        "/api/v0/access/grant",
        &json!({"bucket_id": "b1", "account_name": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorBody = common::parse(&body);
    assert_eq!(error.code, "Aborted");
}

#[tokio::test]
async fn test_revoke_access() {
    let (router, store) = common::setup_router();
    for account in ["alice", "bob"] {
        common::post_json(
            &router,
            "/api/v0/access/grant",
            &json!({"bucket_id": "b1", "account_name": account}),
        )
        .await;
    }

    let (status, _) =
        common::post_json(&router, "/api/v0/access/revoke", &json!({"account_id": "alice"})).await;
    assert_eq!(status, StatusCode::OK);

    let doc = read_document(&store).await.unwrap();
    assert!(doc.identity("alice").is_none());
    assert!(doc.identity("bob").is_some());

    // Unknown accounts revoke cleanly
    let (status, _) =
        common::post_json(&router, "/api/v0/access/revoke", &json!({"account_id": "carol"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_access_per_bucket() {
    let (router, store) = common::setup_router_with_config(ProvisionerConfig {
        revoke_scope: RevokeScope::Bucket,
        ..common::test_config()
    });
    for bucket in ["b1", "b2"] {
        common::post_json(
            &router,
            "/api/v0/access/grant",
            &json!({"bucket_id": bucket, "account_name": "alice"}),
        )
        .await;
    }

    let (status, _) =
        common::post_json(&router, "/api/v0/access/revoke", &json!({"account_id": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::post_json(
        &router,
        "/api/v0/access/revoke",
        &json!({"account_id": "alice", "bucket_id": "b1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let doc = read_document(&store).await.unwrap();
    let alice = doc.identity("alice").unwrap();
    assert!(!alice.has_action("Read:b1"));
    assert!(alice.has_action("Read:b2"));
}

#[tokio::test]
async fn test_status_routes() {
    let (router, _store) = common::setup_router();

    let (status, body) = common::get(&router, "/_status/livez").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::parse::<Value>(&body)["status"], "ok");

    let (status, body) = common::get(&router, "/_status/identity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::parse::<Value>(&body)["name"], common::DRIVER_NAME);

    let (status, body) = common::get(&router, "/_status/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::parse::<Value>(&body)["name"], "cosi-driver");

    let (status, _) = common::get(&router, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn bytes_of(s: &'static str) -> bytes::Bytes {
    bytes::Bytes::from_static(s.as_bytes())
}
