//! Bucket lifecycle operations.
//!
//! The [`Provisioner`] trait is the capability set a transport exposes:
//! create bucket, delete bucket, grant access, revoke access. Each backend
//! variant is one implementation of it, picked at startup.
//!
//! [`IdentityProvisioner`] implements it against a [`DirectoryStore`]:
//! buckets are entries in a buckets directory, and access lives in the
//! shared identity document, updated through a bounded
//! read-modify-compare-and-swap loop.
//!
//! [`DirectoryStore`]: crate::store::DirectoryStore

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod access;
mod bucket;
mod error;
mod identity;

pub use error::{Code, ProvisionError};
pub use identity::IdentityProvisioner;

/// Protocol key the S3 credentials are returned under
pub const S3_PROTOCOL: &str = "s3";

pub const DEFAULT_DRIVER_NAME: &str = "seaweedfs.objectstorage.k8s.io";
pub const DEFAULT_BUCKETS_DIRECTORY: &str = "/buckets";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Provisioner: Send + Sync + 'static {
    /// Create a bucket. Creating a bucket this driver already owns succeeds.
    async fn create_bucket(
        &self,
        req: CreateBucketRequest,
    ) -> Result<CreateBucketResponse, ProvisionError>;

    /// Delete a bucket. Deleting a bucket that does not exist succeeds.
    async fn delete_bucket(
        &self,
        req: DeleteBucketRequest,
    ) -> Result<DeleteBucketResponse, ProvisionError>;

    /// Mint a fresh credential for an account and grant it access to a bucket.
    async fn grant_access(
        &self,
        req: GrantAccessRequest,
    ) -> Result<GrantAccessResponse, ProvisionError>;

    /// Revoke an account's access. Revoking an unknown account succeeds.
    async fn revoke_access(
        &self,
        req: RevokeAccessRequest,
    ) -> Result<RevokeAccessResponse, ProvisionError>;
}

/// How much a revoke call takes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeScope {
    /// Remove the whole account, losing access to every bucket
    #[default]
    Account,
    /// Remove only the account's grants on the named bucket
    Bucket,
}

impl fmt::Display for RevokeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevokeScope::Account => write!(f, "account"),
            RevokeScope::Bucket => write!(f, "bucket"),
        }
    }
}

impl FromStr for RevokeScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(RevokeScope::Account),
            "bucket" => Ok(RevokeScope::Bucket),
            other => Err(format!("unknown revoke scope: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// Name this driver registers under; recorded as the owner of the
    /// buckets it creates
    pub driver_name: String,
    /// Directory and file name of the identity document
    pub iam_directory: String,
    pub identity_file: String,
    /// Directory bucket entries are created in
    pub buckets_directory: String,
    /// S3 endpoint and region handed back to grantees
    pub endpoint: String,
    pub region: String,
    /// Upper bound on read-modify-write attempts per call
    pub max_attempts: u32,
    /// Deadline applied to every lifecycle call, if any
    pub call_timeout: Option<Duration>,
    pub revoke_scope: RevokeScope,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
            iam_directory: crate::iam::IAM_CONFIG_DIRECTORY.to_string(),
            identity_file: crate::iam::IAM_IDENTITY_FILE.to_string(),
            buckets_directory: DEFAULT_BUCKETS_DIRECTORY.to_string(),
            endpoint: String::new(),
            region: String::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
            revoke_scope: RevokeScope::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketResponse {
    pub bucket_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBucketRequest {
    pub bucket_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBucketResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantAccessRequest {
    pub bucket_id: String,
    pub account_name: String,
}

/// Connection details handed to a grantee.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCredentials {
    #[serde(rename = "accessKeyID")]
    pub access_key_id: String,
    #[serde(rename = "accessSecretKey")]
    pub secret_access_key: String,
    pub endpoint: String,
    pub region: String,
}

impl fmt::Debug for BucketCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantAccessResponse {
    pub account_id: String,
    /// Credentials keyed by protocol; always carries [`S3_PROTOCOL`]
    pub credentials: BTreeMap<String, BucketCredentials>,
}

impl GrantAccessResponse {
    pub fn s3(&self) -> Option<&BucketCredentials> {
        self.credentials.get(S3_PROTOCOL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeAccessRequest {
    pub account_id: String,
    /// Required when revoking per bucket, ignored otherwise
    #[serde(default)]
    pub bucket_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeAccessResponse {}

/// Reject empty names and names that would escape their directory.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<(), ProvisionError> {
    if value.is_empty() {
        return Err(ProvisionError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.contains('/') {
        return Err(ProvisionError::InvalidArgument(format!(
            "{} must not contain '/': {}",
            field, value
        )));
    }
    Ok(())
}
