use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::provisioner::{ProvisionError, RevokeAccessRequest, RevokeAccessResponse};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::v0::provision_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RevokeRequest {
    /// Account whose access is revoked
    #[arg(long)]
    pub account_id: String,
    /// Bucket to revoke, required when the driver revokes per bucket
    #[arg(long)]
    #[serde(default)]
    pub bucket_id: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RevokeRequest>,
) -> Result<impl IntoResponse, RevokeError> {
    let response = state
        .provisioner()
        .revoke_access(RevokeAccessRequest {
            account_id: req.account_id,
            bucket_id: req.bucket_id,
        })
        .await?;

    Ok((http::StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    #[error("Failed to revoke access: {0}")]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for RevokeError {
    fn into_response(self) -> Response {
        match self {
            RevokeError::Provision(e) => provision_error_response(&e),
        }
    }
}

impl ApiRequest for RevokeRequest {
    type Response = RevokeAccessResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/access/revoke")?;
        Ok(client.post(full_url).json(&self))
    }
}
