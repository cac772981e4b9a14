use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::iam::IdentityDocument;
use crate::store::{DirectoryStore, StoreError};

use super::{
    CreateBucketRequest, CreateBucketResponse, DeleteBucketRequest, DeleteBucketResponse,
    GrantAccessRequest, GrantAccessResponse, ProvisionError, Provisioner, ProvisionerConfig,
    RevokeAccessRequest, RevokeAccessResponse,
};

/// Pause between compare-and-swap attempts, multiplied by the attempt number
const CAS_BACKOFF: Duration = Duration::from_millis(20);

/// Result of one read-modify-write of the identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciled {
    /// The mutation found nothing to do; nothing was written
    Unchanged,
    /// The mutated document was written back
    Written { attempts: u32 },
}

/// Provisioner backed by a [`DirectoryStore`] holding bucket entries and
/// the identity document.
#[derive(Debug, Clone)]
pub struct IdentityProvisioner {
    store: Arc<dyn DirectoryStore>,
    config: ProvisionerConfig,
}

impl IdentityProvisioner {
    pub fn new(store: Arc<dyn DirectoryStore>, config: ProvisionerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    /// Read the current identity document. A missing document is empty.
    pub async fn load_document(&self) -> Result<IdentityDocument, ProvisionError> {
        let entry = self
            .store
            .lookup(&self.config.iam_directory, &self.config.identity_file)
            .await?;
        match entry {
            Some(entry) => Ok(IdentityDocument::decode(&entry.content)?),
            None => Ok(IdentityDocument::default()),
        }
    }

    /// Run `call` under the configured deadline.
    pub(crate) async fn with_deadline<T, F>(&self, call: F) -> Result<T, ProvisionError>
    where
        F: Future<Output = Result<T, ProvisionError>> + Send,
    {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProvisionError::DeadlineExceeded(limit))?,
            None => call.await,
        }
    }

    /// Read the identity document, apply `mutate`, and write it back only if
    /// nobody else wrote it in between.
    ///
    /// `mutate` returns whether it changed the document; it may be applied
    /// more than once, each time to a freshly read document.
    pub(crate) async fn reconcile<F>(&self, mut mutate: F) -> Result<Reconciled, ProvisionError>
    where
        F: FnMut(&mut IdentityDocument) -> bool + Send,
    {
        let directory = self.config.iam_directory.as_str();
        let file = self.config.identity_file.as_str();
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let current = self.store.lookup(directory, file).await?;
            let (mut document, version) = match current {
                Some(entry) => (IdentityDocument::decode(&entry.content)?, Some(entry.version)),
                None => (IdentityDocument::default(), None),
            };

            if !mutate(&mut document) {
                return Ok(Reconciled::Unchanged);
            }

            let content = Bytes::from(document.encode()?);
            let written = match &version {
                Some(version) => {
                    self.store
                        .update_if_unchanged(directory, file, version, content)
                        .await
                }
                None => self.store.create(directory, file, content).await,
            };

            match written {
                Ok(_) => return Ok(Reconciled::Written { attempts: attempt }),
                Err(StoreError::Conflict(_)) | Err(StoreError::AlreadyExists(_)) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        "identity document changed concurrently, retrying"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(CAS_BACKOFF * attempt).await;
                    }
                }
                Err(StoreError::NotFound(_)) => return Err(ProvisionError::DocumentVanished),
                Err(e) => return Err(e.into()),
            }
        }

        Err(ProvisionError::Conflict {
            attempts: max_attempts,
        })
    }
}

#[async_trait]
impl Provisioner for IdentityProvisioner {
    async fn create_bucket(
        &self,
        req: CreateBucketRequest,
    ) -> Result<CreateBucketResponse, ProvisionError> {
        self.with_deadline(self.create_bucket_inner(req)).await
    }

    async fn delete_bucket(
        &self,
        req: DeleteBucketRequest,
    ) -> Result<DeleteBucketResponse, ProvisionError> {
        self.with_deadline(self.delete_bucket_inner(req)).await
    }

    async fn grant_access(
        &self,
        req: GrantAccessRequest,
    ) -> Result<GrantAccessResponse, ProvisionError> {
        self.with_deadline(self.grant_access_inner(req)).await
    }

    async fn revoke_access(
        &self,
        req: RevokeAccessRequest,
    ) -> Result<RevokeAccessResponse, ProvisionError> {
        self.with_deadline(self.revoke_access_inner(req)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::{Action, Credential};
    use crate::testkit::FaultyStore;

    fn provisioner(store: FaultyStore) -> IdentityProvisioner {
        IdentityProvisioner::new(Arc::new(store), ProvisionerConfig::default())
    }

    #[tokio::test]
    async fn test_reconcile_unchanged_skips_write() {
        let store = FaultyStore::memory();
        let p = provisioner(store.clone());

        let result = p.reconcile(|doc| doc.revoke("nobody")).await.unwrap();
        assert_eq!(result, Reconciled::Unchanged);
        assert_eq!(store.writes(), 0);
        assert!(store.inner().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_creates_then_updates() {
        let store = FaultyStore::memory();
        let p = provisioner(store.clone());

        let grant = |name: &'static str| {
            move |doc: &mut IdentityDocument| {
                doc.grant(name, Some(Credential::new("AK", "SK")), &Action::bucket_access("b"))
                    .changed()
            }
        };

        p.reconcile(grant("alice")).await.unwrap();
        p.reconcile(grant("bob")).await.unwrap();

        let doc = p.load_document().await.unwrap();
        assert!(doc.identity("alice").is_some());
        assert!(doc.identity("bob").is_some());
    }

    #[tokio::test]
    async fn test_reconcile_retries_conflicts() {
        let store = FaultyStore::memory();
        let p = provisioner(store.clone());
        p.reconcile(|doc| doc.grant("bob", None, &[]).changed())
            .await
            .unwrap();

        store.conflict_updates(2);
        let mut applied = 0;
        let result = p
            .reconcile(|doc| {
                applied += 1;
                doc.grant("alice", None, &[]).changed()
            })
            .await
            .unwrap();

        assert_eq!(result, Reconciled::Written { attempts: 3 });
        assert_eq!(applied, 3);
    }

    #[tokio::test]
    async fn test_reconcile_gives_up_after_max_attempts() {
        let store = FaultyStore::memory();
        let p = provisioner(store.clone());
        store.conflict_updates(usize::MAX);

        let err = p
            .reconcile(|doc| doc.grant("alice", None, &[]).changed())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Conflict { attempts: 5 }));
    }

    #[tokio::test]
    async fn test_reconcile_surfaces_malformed_document() {
        let store = FaultyStore::memory();
        store
            .inner()
            .create("/etc/iam", "identity.json", Bytes::from_static(b"not json"))
            .await
            .unwrap();
        let p = provisioner(store.clone());

        let err = p
            .reconcile(|doc| doc.grant("alice", None, &[]).changed())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::MalformedDocument(_)));

        // nothing was discarded
        let entry = store
            .inner()
            .lookup("/etc/iam", "identity.json")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.content, Bytes::from_static(b"not json"));
    }

    #[tokio::test]
    async fn test_with_deadline() {
        let mut config = ProvisionerConfig::default();
        config.call_timeout = Some(Duration::from_millis(10));
        let p = IdentityProvisioner::new(Arc::new(FaultyStore::memory()), config);

        let err = p
            .with_deadline(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::DeadlineExceeded(_)));
    }
}
