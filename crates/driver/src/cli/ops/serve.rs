use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use common::provisioner::RevokeScope;
use cosi_driver::process::ProcessError;
use cosi_driver::{spawn_service, ConfigError, DriverConfig, Overrides, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// TOML config file (store backend, directories, retry bound, timeout)
    #[arg(long, env = "COSI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name the driver registers under
    #[arg(long, env = "DRIVERNAME")]
    pub driver_name: Option<String>,

    /// S3 endpoint handed back to grantees
    #[arg(long, env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// S3 region handed back to grantees
    #[arg(long, env = "REGION")]
    pub region: Option<String>,

    /// Access key for the S3 store backend
    #[arg(long, env = "ACCESSKEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret key for the S3 store backend
    #[arg(long, env = "SECRETKEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Address for the API server (default 0.0.0.0:8080)
    #[arg(long, env = "LISTEN_ADDR")]
    pub listen_addr: Option<SocketAddr>,

    /// Revoke whole accounts or single bucket grants
    #[arg(long, env = "REVOKE_SCOPE")]
    pub revoke_scope: Option<RevokeScope>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("driver failed: {0}")]
    Process(#[from] ProcessError),
}

impl Serve {
    fn driver_config(&self) -> Result<DriverConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };
        config.apply(Overrides {
            driver_name: self.driver_name.clone(),
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            listen_addr: self.listen_addr,
            revoke_scope: self.revoke_scope,
        });
        config.validate()?;
        Ok(config)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let driver = self.driver_config()?;
        let config = ServiceConfig::from_driver_config(&driver, self.log_level, self.log_dir.clone());

        spawn_service(&config).await?;
        Ok("driver stopped".to_string())
    }
}
