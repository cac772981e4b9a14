use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

use super::identity::IdentityProvisioner;
use super::{
    validate_name, CreateBucketRequest, CreateBucketResponse, DeleteBucketRequest,
    DeleteBucketResponse, ProvisionError,
};

/// Content of a bucket entry, recording which driver created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BucketMarker {
    owner: String,
}

impl IdentityProvisioner {
    fn bucket_marker(&self) -> Result<Bytes, ProvisionError> {
        let marker = BucketMarker {
            owner: self.config().driver_name.clone(),
        };
        serde_json::to_vec(&marker)
            .map(Bytes::from)
            .map_err(|e| ProvisionError::Internal(e.to_string()))
    }

    fn owns_bucket(&self, content: &[u8]) -> bool {
        serde_json::from_slice::<BucketMarker>(content)
            .map(|marker| marker.owner == self.config().driver_name)
            .unwrap_or(false)
    }

    pub(crate) async fn create_bucket_inner(
        &self,
        req: CreateBucketRequest,
    ) -> Result<CreateBucketResponse, ProvisionError> {
        validate_name("bucket name", &req.name)?;
        tracing::info!(bucket = %req.name, "creating bucket");

        let directory = self.config().buckets_directory.as_str();
        let marker = self.bucket_marker()?;
        let max_attempts = self.config().max_attempts.max(1);

        for _ in 0..max_attempts {
            match self.store().create(directory, &req.name, marker.clone()).await {
                Ok(_) => {
                    tracing::info!(bucket = %req.name, "successfully created bucket");
                    return Ok(CreateBucketResponse {
                        bucket_id: req.name,
                    });
                }
                Err(StoreError::AlreadyExists(_)) => {
                    match self.store().lookup(directory, &req.name).await? {
                        Some(entry) if self.owns_bucket(&entry.content) => {
                            tracing::info!(bucket = %req.name, "bucket already exists and is ours");
                            return Ok(CreateBucketResponse {
                                bucket_id: req.name,
                            });
                        }
                        Some(_) => {
                            tracing::warn!(bucket = %req.name, "bucket exists with another owner");
                            return Err(ProvisionError::AlreadyExists(req.name));
                        }
                        // deleted between create and lookup
                        None => continue,
                    }
                }
                Err(e) => {
                    tracing::error!(bucket = %req.name, error = %e, "failed to create bucket");
                    return Err(e.into());
                }
            }
        }

        Err(ProvisionError::Conflict {
            attempts: max_attempts,
        })
    }

    pub(crate) async fn delete_bucket_inner(
        &self,
        req: DeleteBucketRequest,
    ) -> Result<DeleteBucketResponse, ProvisionError> {
        validate_name("bucket id", &req.bucket_id)?;
        tracing::info!(bucket = %req.bucket_id, "deleting bucket");

        let directory = self.config().buckets_directory.as_str();
        match self.store().delete(directory, &req.bucket_id).await {
            Ok(()) => {
                tracing::info!(bucket = %req.bucket_id, "successfully deleted bucket");
                Ok(DeleteBucketResponse {})
            }
            Err(StoreError::NotFound(_)) => {
                tracing::info!(bucket = %req.bucket_id, "bucket already absent");
                Ok(DeleteBucketResponse {})
            }
            Err(e) => {
                tracing::error!(bucket = %req.bucket_id, error = %e, "failed to delete bucket");
                Err(e.into())
            }
        }
    }
}
