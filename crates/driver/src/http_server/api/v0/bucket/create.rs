use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::provisioner::{CreateBucketRequest, CreateBucketResponse, ProvisionError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::v0::provision_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateRequest {
    /// Name of the bucket to create
    #[arg(long)]
    pub name: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    let response = state
        .provisioner()
        .create_bucket(CreateBucketRequest { name: req.name })
        .await?;

    Ok((http::StatusCode::CREATED, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("Failed to create bucket: {0}")]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::Provision(e) => provision_error_response(&e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateBucketResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/bucket")?;
        Ok(client.post(full_url).json(&self))
    }
}
