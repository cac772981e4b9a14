use cosi_driver::http_server::api::client::ApiError;
use cosi_driver::http_server::api::v0::bucket::DeleteRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for DeleteRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Deleted bucket {}", self.bucket_id))
    }
}
