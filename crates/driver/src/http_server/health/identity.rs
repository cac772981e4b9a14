use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ServiceState;

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Name the driver registers under
    pub name: String,
}

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let name = state.driver_name().to_string();
    (StatusCode::OK, Json(IdentityResponse { name })).into_response()
}
