use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::iam::{IAM_CONFIG_DIRECTORY, IAM_IDENTITY_FILE};
use common::provisioner::{
    ProvisionerConfig, RevokeScope, DEFAULT_BUCKETS_DIRECTORY, DEFAULT_CALL_TIMEOUT,
    DEFAULT_DRIVER_NAME, DEFAULT_MAX_ATTEMPTS,
};
use common::store::StoreConfig;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// On-disk driver configuration, read from a TOML file.
///
/// Every field has a default, so an empty file (or no file at all) yields a
/// driver over an in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Name the driver registers under
    #[serde(default = "default_driver_name")]
    pub driver_name: String,
    /// S3 endpoint handed back to grantees
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    /// Address the HTTP API listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Backend holding the identity document and bucket entries
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "default_iam_directory")]
    pub iam_directory: String,
    #[serde(default = "default_identity_file")]
    pub identity_file: String,
    #[serde(default = "default_buckets_directory")]
    pub buckets_directory: String,

    /// Compare-and-swap attempts per identity document update
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-call deadline in seconds, 0 disables it
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default)]
    pub revoke_scope: RevokeScope,
}

fn default_driver_name() -> String {
    DEFAULT_DRIVER_NAME.to_string()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_iam_directory() -> String {
    IAM_CONFIG_DIRECTORY.to_string()
}

fn default_identity_file() -> String {
    IAM_IDENTITY_FILE.to_string()
}

fn default_buckets_directory() -> String {
    DEFAULT_BUCKETS_DIRECTORY.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_name: default_driver_name(),
            endpoint: String::new(),
            region: String::new(),
            listen_addr: default_listen_addr(),
            store: StoreConfig::default(),
            iam_directory: default_iam_directory(),
            identity_file: default_identity_file(),
            buckets_directory: default_buckets_directory(),
            max_attempts: default_max_attempts(),
            call_timeout_secs: default_call_timeout_secs(),
            revoke_scope: RevokeScope::default(),
        }
    }
}

/// Values taken from the command line or environment. Anything set here
/// wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub driver_name: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub listen_addr: Option<SocketAddr>,
    pub revoke_scope: Option<RevokeScope>,
}

impl DriverConfig {
    /// Load the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver_name.is_empty() {
            return Err(ConfigError::Invalid("driver_name must not be empty".into()));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".into(),
            ));
        }
        if let StoreConfig::S3 { bucket, .. } = &self.store {
            if bucket.is_empty() {
                return Err(ConfigError::Invalid("s3 store needs a bucket".into()));
            }
        }
        Ok(())
    }

    /// Apply command line / environment values on top of the file.
    ///
    /// The backend credentials only make sense for an S3 store; the endpoint
    /// also fills in the S3 store's endpoint when the file leaves it empty.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(name) = overrides.driver_name {
            self.driver_name = name;
        }
        if let Some(endpoint) = overrides.endpoint {
            if let StoreConfig::S3 {
                endpoint: store_endpoint,
                ..
            } = &mut self.store
            {
                if store_endpoint.is_empty() {
                    *store_endpoint = endpoint.clone();
                }
            }
            self.endpoint = endpoint;
        }
        if let Some(region) = overrides.region {
            self.region = region;
        }
        if let StoreConfig::S3 {
            access_key,
            secret_key,
            ..
        } = &mut self.store
        {
            if let Some(key) = overrides.access_key {
                *access_key = key;
            }
            if let Some(secret) = overrides.secret_key {
                *secret_key = secret;
            }
        }
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(scope) = overrides.revoke_scope {
            self.revoke_scope = scope;
        }
    }

    pub fn provisioner_config(&self) -> ProvisionerConfig {
        let call_timeout = match self.call_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        ProvisionerConfig {
            driver_name: self.driver_name.clone(),
            iam_directory: self.iam_directory.clone(),
            identity_file: self.identity_file.clone(),
            buckets_directory: self.buckets_directory.clone(),
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            max_attempts: self.max_attempts,
            call_timeout,
            revoke_scope: self.revoke_scope,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
