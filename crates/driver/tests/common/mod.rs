//! Shared helpers for driving the HTTP API in-process
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::ServiceExt;

use ::common::provisioner::{IdentityProvisioner, ProvisionerConfig};
use ::common::testkit::FaultyStore;
use cosi_driver::http_server;
use cosi_driver::ServiceState;

pub const DRIVER_NAME: &str = "seaweedfs.objectstorage.k8s.io";
pub const ENDPOINT: &str = "http://seaweedfs-s3:8333";
pub const REGION: &str = "us-east-1";

pub fn test_config() -> ProvisionerConfig {
    ProvisionerConfig {
        driver_name: DRIVER_NAME.to_string(),
        endpoint: ENDPOINT.to_string(),
        region: REGION.to_string(),
        call_timeout: Some(Duration::from_secs(5)),
        ..ProvisionerConfig::default()
    }
}

/// Build the full router over a fault-injectable in-memory store
pub fn setup_router() -> (Router, FaultyStore) {
    setup_router_with_config(test_config())
}

pub fn setup_router_with_config(config: ProvisionerConfig) -> (Router, FaultyStore) {
    let store = FaultyStore::memory();
    let driver_name = config.driver_name.clone();
    let provisioner = IdentityProvisioner::new(Arc::new(store.clone()), config);
    let state = ServiceState::new(Arc::new(provisioner), &driver_name);
    (http_server::router(state), store)
}

/// POST a JSON body and return the status and the raw response body
pub async fn post_json<T: Serialize>(router: &Router, uri: &str, body: &T) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}
