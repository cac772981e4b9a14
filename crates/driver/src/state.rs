use std::sync::Arc;

use common::provisioner::{IdentityProvisioner, Provisioner};
use common::store::{ObjectDirectoryStore, StoreError};

use crate::service_config::Config;

/// Main service state shared by every request handler
#[derive(Clone)]
pub struct State {
    provisioner: Arc<dyn Provisioner>,
    driver_name: Arc<str>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        tracing::info!(store = store_kind(config), "connecting to backend store");
        let store = ObjectDirectoryStore::new(config.store.clone()).await?;
        let provisioner = IdentityProvisioner::new(Arc::new(store), config.provisioner.clone());

        tracing::info!(
            driver_name = %config.provisioner.driver_name,
            revoke_scope = %config.provisioner.revoke_scope,
            "provisioner ready"
        );
        Ok(Self::new(
            Arc::new(provisioner),
            &config.provisioner.driver_name,
        ))
    }

    pub fn new(provisioner: Arc<dyn Provisioner>, driver_name: &str) -> Self {
        Self {
            provisioner,
            driver_name: Arc::from(driver_name),
        }
    }

    pub fn provisioner(&self) -> &dyn Provisioner {
        self.provisioner.as_ref()
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }
}

// Store variant name without its credentials
fn store_kind(config: &Config) -> &'static str {
    use common::store::StoreConfig;
    match config.store {
        StoreConfig::Memory => "memory",
        StoreConfig::Local { .. } => "local",
        StoreConfig::S3 { .. } => "s3",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to set up backend store: {0}")]
    Store(#[from] StoreError),
}
