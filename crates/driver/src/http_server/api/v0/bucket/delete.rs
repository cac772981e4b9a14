use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::provisioner::{DeleteBucketRequest, DeleteBucketResponse, ProvisionError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::api::v0::provision_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// Id of the bucket to delete
    #[arg(long)]
    pub bucket_id: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<DeleteRequest>,
) -> Result<impl IntoResponse, DeleteError> {
    let response = state
        .provisioner()
        .delete_bucket(DeleteBucketRequest {
            bucket_id: req.bucket_id,
        })
        .await?;

    Ok((http::StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("Failed to delete bucket: {0}")]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Provision(e) => provision_error_response(&e),
        }
    }
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteBucketResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/bucket/delete")?;
        Ok(client.post(full_url).json(&self))
    }
}
