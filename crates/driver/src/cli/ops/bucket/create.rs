use cosi_driver::http_server::api::client::ApiError;
use cosi_driver::http_server::api::v0::bucket::CreateRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for CreateRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!("Created bucket {}", response.bucket_id))
    }
}
