use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::provisioner::{GrantAccessRequest, GrantAccessResponse, ProvisionError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::v0::provision_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GrantRequest {
    /// Bucket to grant access to
    #[arg(long)]
    pub bucket_id: String,
    /// Account receiving a fresh credential
    #[arg(long)]
    pub account_name: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<GrantRequest>,
) -> Result<impl IntoResponse, GrantError> {
    let response = state
        .provisioner()
        .grant_access(GrantAccessRequest {
            bucket_id: req.bucket_id,
            account_name: req.account_name,
        })
        .await?;

    Ok((http::StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error("Failed to grant access: {0}")]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for GrantError {
    fn into_response(self) -> Response {
        match self {
            GrantError::Provision(e) => provision_error_response(&e),
        }
    }
}

impl ApiRequest for GrantRequest {
    type Response = GrantAccessResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/access/grant")?;
        Ok(client.post(full_url).json(&self))
    }
}
