use clap::{Args, Subcommand};

pub mod create;
pub mod delete;

use crate::cli::op::Op;
use cosi_driver::http_server::api::v0::bucket::{CreateRequest, DeleteRequest};

crate::command_enum! {
    (Create, CreateRequest),
    (Delete, DeleteRequest),
}

// Rename the generated Command to BucketCommand for clarity
pub type BucketCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Bucket {
    #[command(subcommand)]
    pub command: BucketCommand,
}

#[async_trait::async_trait]
impl Op for Bucket {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
