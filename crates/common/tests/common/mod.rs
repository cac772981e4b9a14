//! Shared test utilities for provisioner integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ::common::iam::IdentityDocument;
use ::common::provisioner::{IdentityProvisioner, ProvisionerConfig};
use ::common::store::DirectoryStore;
use ::common::testkit::FaultyStore;

pub const ENDPOINT: &str = "http://seaweedfs-s3:8333";
pub const REGION: &str = "us-east-1";

pub fn test_config() -> ProvisionerConfig {
    ProvisionerConfig {
        endpoint: ENDPOINT.to_string(),
        region: REGION.to_string(),
        call_timeout: Some(Duration::from_secs(5)),
        ..ProvisionerConfig::default()
    }
}

/// Set up a provisioner over a fault-injectable in-memory store
pub fn setup_provisioner() -> (IdentityProvisioner, FaultyStore) {
    setup_with_config(test_config())
}

pub fn setup_with_config(config: ProvisionerConfig) -> (IdentityProvisioner, FaultyStore) {
    let store = FaultyStore::memory();
    let provisioner = IdentityProvisioner::new(Arc::new(store.clone()), config);
    (provisioner, store)
}

/// Read the identity document straight from the store, bypassing the provisioner
pub async fn read_document(store: &FaultyStore) -> Option<IdentityDocument> {
    store
        .inner()
        .lookup("/etc/iam", "identity.json")
        .await
        .unwrap()
        .map(|entry| IdentityDocument::decode(&entry.content).unwrap())
}
