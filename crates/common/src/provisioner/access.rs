use std::collections::BTreeMap;

use crate::iam::{Action, Credential};

use super::identity::{IdentityProvisioner, Reconciled};
use super::{
    validate_name, BucketCredentials, GrantAccessRequest, GrantAccessResponse, ProvisionError,
    RevokeAccessRequest, RevokeAccessResponse, RevokeScope, S3_PROTOCOL,
};

impl IdentityProvisioner {
    pub(crate) async fn grant_access_inner(
        &self,
        req: GrantAccessRequest,
    ) -> Result<GrantAccessResponse, ProvisionError> {
        validate_name("bucket id", &req.bucket_id)?;
        validate_name("account name", &req.account_name)?;
        tracing::info!(
            bucket = %req.bucket_id,
            account = %req.account_name,
            "granting bucket access"
        );

        // Every call mints a new pair; retried calls do not get the old secret back
        let credential = Credential::generate();
        let actions = Action::bucket_access(&req.bucket_id);

        let result = self
            .reconcile(|doc| {
                doc.grant(&req.account_name, Some(credential.clone()), &actions)
                    .changed()
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket = %req.bucket_id,
                    account = %req.account_name,
                    error = %e,
                    "failed to grant bucket access"
                );
                e
            })?;

        if let Reconciled::Written { attempts } = result {
            tracing::info!(
                bucket = %req.bucket_id,
                account = %req.account_name,
                attempts,
                "successfully granted bucket access"
            );
        }

        let config = self.config();
        let mut credentials = BTreeMap::new();
        credentials.insert(
            S3_PROTOCOL.to_string(),
            BucketCredentials {
                access_key_id: credential.access_key,
                secret_access_key: credential.secret_key,
                endpoint: config.endpoint.clone(),
                region: config.region.clone(),
            },
        );

        Ok(GrantAccessResponse {
            account_id: req.account_name,
            credentials,
        })
    }

    pub(crate) async fn revoke_access_inner(
        &self,
        req: RevokeAccessRequest,
    ) -> Result<RevokeAccessResponse, ProvisionError> {
        validate_name("account id", &req.account_id)?;

        let bucket = match (self.config().revoke_scope, req.bucket_id.as_deref()) {
            (RevokeScope::Account, _) => None,
            (RevokeScope::Bucket, Some(bucket)) => {
                validate_name("bucket id", bucket)?;
                Some(bucket)
            }
            (RevokeScope::Bucket, None) => {
                return Err(ProvisionError::InvalidArgument(
                    "bucket id is required when revoking per bucket".into(),
                ))
            }
        };
        tracing::info!(account = %req.account_id, bucket = ?bucket, "revoking bucket access");

        let result = self
            .reconcile(|doc| match bucket {
                Some(bucket) => doc.revoke_bucket(&req.account_id, bucket).changed(),
                None => doc.revoke(&req.account_id),
            })
            .await;

        match result {
            Ok(Reconciled::Written { .. }) => {
                tracing::info!(account = %req.account_id, "successfully revoked bucket access");
            }
            Ok(Reconciled::Unchanged) => {
                tracing::info!(account = %req.account_id, "account holds no matching access");
            }
            // A deleted identity document holds no access to revoke
            Err(ProvisionError::DocumentVanished) => {
                tracing::info!(account = %req.account_id, "identity document gone, nothing to revoke");
            }
            Err(e) => {
                tracing::error!(account = %req.account_id, error = %e, "failed to revoke access");
                return Err(e);
            }
        }

        Ok(RevokeAccessResponse {})
    }
}
