pub mod config;
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod state;
pub mod version;

// Re-exports for the CLI binary and tests
pub use config::{ConfigError, DriverConfig, Overrides};
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use state::{State as ServiceState, StateSetupError};
pub use version::{build_info, BuildInfo};
