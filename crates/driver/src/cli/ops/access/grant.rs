use cosi_driver::http_server::api::client::ApiError;
use cosi_driver::http_server::api::v0::access::GrantRequest;

#[derive(Debug, thiserror::Error)]
pub enum GrantOpError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("driver returned no s3 credentials")]
    MissingCredentials,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for GrantRequest {
    type Error = GrantOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        let s3 = response.s3().ok_or(GrantOpError::MissingCredentials)?;

        // The secret is only ever shown here, once
        Ok([
            format!("account:         {}", response.account_id),
            format!("accessKeyID:     {}", s3.access_key_id),
            format!("accessSecretKey: {}", s3.secret_access_key),
            format!("endpoint:        {}", s3.endpoint),
            format!("region:          {}", s3.region),
        ]
        .join("\n"))
    }
}
