use clap::{Args, Subcommand};

pub mod grant;
pub mod revoke;

use crate::cli::op::Op;
use cosi_driver::http_server::api::v0::access::{GrantRequest, RevokeRequest};

crate::command_enum! {
    (Grant, GrantRequest),
    (Revoke, RevokeRequest),
}

pub type AccessCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Access {
    #[command(subcommand)]
    pub command: AccessCommand,
}

#[async_trait::async_trait]
impl Op for Access {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
