pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "cosi-driver")]
#[command(about = "SeaweedFS COSI provisioner: daemon and client")]
pub struct Args {
    /// Address of a running driver's API, used by the client subcommands
    #[arg(
        long,
        global = true,
        env = "COSI_DRIVER_URL",
        default_value = "http://localhost:8080"
    )]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}
