use std::net::SocketAddr;
use std::path::PathBuf;

use common::provisioner::ProvisionerConfig;
use common::store::StoreConfig;

use crate::config::DriverConfig;

/// Fully resolved runtime configuration of the driver service.
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Address for the API HTTP server
    pub listen_addr: SocketAddr,

    // backend configuration
    /// Store holding bucket entries and the identity document
    pub store: StoreConfig,
    pub provisioner: ProvisionerConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_driver_config(
        driver: &DriverConfig,
        log_level: tracing::Level,
        log_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            listen_addr: driver.listen_addr,
            store: driver.store.clone(),
            provisioner: driver.provisioner_config(),
            log_level,
            log_dir,
        }
    }
}
