use cosi_driver::http_server::api::client::ApiError;
use cosi_driver::http_server::api::v0::access::RevokeRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for RevokeRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(match &self.bucket_id {
            Some(bucket) => format!("Revoked {} on bucket {}", self.account_id, bucket),
            None => format!("Revoked {}", self.account_id),
        })
    }
}
