//! Directory store over the `object_store` crate (S3/MinIO/local filesystem/memory).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutMode, PutOptions, PutResult, UpdateVersion};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{entry_key, DirectoryStore, Entry, StoreError, Version};

/// Configuration for the backend holding the directory entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, SeaweedFS S3 gateway, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:8333")
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Bucket holding the driver's entries
        bucket: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
        /// Guard creates and compare-and-swap with `If-None-Match`/`If-Match`.
        /// Turn off for gateways that reject conditional writes; writes are
        /// then only serialized within this process.
        #[serde(default = "default_conditional_put")]
        conditional_put: bool,
    },
}

fn default_conditional_put() -> bool {
    true
}

/// S3 client builder for the given connection settings.
fn s3_builder(
    endpoint: &str,
    access_key: &str,
    secret_key: &str,
    bucket: &str,
    region: Option<&str>,
    conditional_put: bool,
) -> AmazonS3Builder {
    let builder = AmazonS3Builder::new()
        .with_endpoint(endpoint)
        .with_access_key_id(access_key)
        .with_secret_access_key(secret_key)
        .with_bucket_name(bucket)
        .with_region(region.unwrap_or("us-east-1"))
        .with_allow_http(endpoint.starts_with("http://"));
    if conditional_put {
        builder.with_conditional_put(S3ConditionalPut::ETagMatch)
    } else {
        builder
    }
}

/// [`DirectoryStore`] backed by an [`ObjectStore`].
///
/// Creates use `PutMode::Create` and conditional updates `PutMode::Update`.
/// Backends that implement neither (the local filesystem for updates, S3
/// with `conditional_put` off) get a check-then-write emulation serialized
/// by a process-local lock.
#[derive(Debug)]
pub struct ObjectDirectoryStore {
    inner: Arc<dyn ObjectStore>,
    emulate_cas: AtomicBool,
    cas_lock: Mutex<()>,
}

impl ObjectDirectoryStore {
    /// Create a new store from configuration.
    pub async fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let inner: Arc<dyn ObjectStore> = match &config {
            StoreConfig::Memory => Arc::new(InMemory::new()),

            StoreConfig::Local { path } => {
                tokio::fs::create_dir_all(path)
                    .await
                    .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }

            StoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
                conditional_put,
            } => {
                let builder = s3_builder(
                    endpoint,
                    access_key,
                    secret_key,
                    bucket,
                    region.as_deref(),
                    *conditional_put,
                );

                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );

                // Fail fast if the bucket doesn't exist
                {
                    use futures::TryStreamExt;
                    let mut stream = store.list(None);
                    match stream.try_next().await {
                        Ok(_) => {}
                        Err(object_store::Error::NotFound { .. }) => {
                            return Err(StoreError::InvalidConfig(format!(
                                "S3 bucket '{}' does not exist",
                                bucket
                            )));
                        }
                        Err(e) => return Err(StoreError::Unavailable(e.to_string())),
                    }
                }

                store
            }
        };

        Ok(Self::from_object_store(inner))
    }

    /// Wrap an already constructed object store.
    pub fn from_object_store(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            emulate_cas: AtomicBool::new(false),
            cas_lock: Mutex::new(()),
        }
    }

    fn path(directory: &str, name: &str) -> (String, ObjectPath) {
        let key = entry_key(directory, name);
        let path = ObjectPath::from(key.as_str());
        (key, path)
    }

    async fn put(
        &self,
        key: &str,
        path: &ObjectPath,
        content: Bytes,
        mode: PutMode,
    ) -> Result<Version, StoreError> {
        self.inner
            .put_opts(path, content.into(), PutOptions::from(mode))
            .await
            .map(version_of_put)
            .map_err(|e| map_err(key, e))
    }

    async fn head(&self, key: &str, path: &ObjectPath) -> Result<ObjectMeta, StoreError> {
        self.inner.head(path).await.map_err(|e| map_err(key, e))
    }

    fn start_emulating(&self, key: &str) {
        if !self.emulate_cas.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                key = %key,
                "backend lacks conditional writes, emulating them in process"
            );
        }
    }

    async fn emulated_create(
        &self,
        key: &str,
        path: &ObjectPath,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let _guard = self.cas_lock.lock().await;
        match self.head(key, path).await {
            Ok(_) => Err(StoreError::AlreadyExists(key.to_string())),
            Err(StoreError::NotFound(_)) => {
                self.put(key, path, content, PutMode::Overwrite).await
            }
            Err(e) => Err(e),
        }
    }

    async fn emulated_update_if_unchanged(
        &self,
        key: &str,
        path: &ObjectPath,
        expected: &Version,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let _guard = self.cas_lock.lock().await;
        let current = version_of_meta(self.head(key, path).await?);
        if &current != expected {
            return Err(StoreError::Conflict(key.to_string()));
        }
        self.put(key, path, content, PutMode::Overwrite).await
    }
}

#[async_trait]
impl DirectoryStore for ObjectDirectoryStore {
    async fn lookup(&self, directory: &str, name: &str) -> Result<Option<Entry>, StoreError> {
        let (key, path) = Self::path(directory, name);
        match self.inner.get(&path).await {
            Ok(result) => {
                let version = version_of_meta(result.meta.clone());
                let content = result.bytes().await.map_err(|e| map_err(&key, e))?;
                Ok(Some(Entry { content, version }))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(map_err(&key, e)),
        }
    }

    async fn create(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let (key, path) = Self::path(directory, name);
        match self.put(&key, &path, content.clone(), PutMode::Create).await {
            Err(StoreError::Unsupported(_)) => {
                self.start_emulating(&key);
                self.emulated_create(&key, &path, content).await
            }
            result => result,
        }
    }

    async fn update(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let (key, path) = Self::path(directory, name);
        self.head(&key, &path).await?;
        self.put(&key, &path, content, PutMode::Overwrite).await
    }

    async fn update_if_unchanged(
        &self,
        directory: &str,
        name: &str,
        expected: &Version,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let (key, path) = Self::path(directory, name);

        if self.emulate_cas.load(Ordering::Relaxed) {
            return self
                .emulated_update_if_unchanged(&key, &path, expected, content)
                .await;
        }

        let mode = PutMode::Update(UpdateVersion {
            e_tag: expected.e_tag.clone(),
            version: expected.version.clone(),
        });
        match self.put(&key, &path, content.clone(), mode).await {
            Err(StoreError::Unsupported(_)) => {
                self.start_emulating(&key);
                self.emulated_update_if_unchanged(&key, &path, expected, content)
                    .await
            }
            result => result,
        }
    }

    async fn delete(&self, directory: &str, name: &str) -> Result<(), StoreError> {
        let (key, path) = Self::path(directory, name);
        // Object stores treat deleting a missing key as success, so check first
        self.head(&key, &path).await?;
        self.inner.delete(&path).await.map_err(|e| map_err(&key, e))
    }
}

fn version_of_meta(meta: ObjectMeta) -> Version {
    Version {
        e_tag: meta.e_tag,
        version: meta.version,
    }
}

fn version_of_put(result: PutResult) -> Version {
    Version {
        e_tag: result.e_tag,
        version: result.version,
    }
}

fn map_err(key: &str, err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
        object_store::Error::AlreadyExists { .. } => StoreError::AlreadyExists(key.to_string()),
        object_store::Error::Precondition { .. } => StoreError::Conflict(key.to_string()),
        object_store::Error::NotImplemented => StoreError::Unsupported(key.to_string()),
        e => StoreError::Unavailable(e.to_string()),
    }
}
