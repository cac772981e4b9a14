use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use common::provisioner::{Code, ProvisionError};

pub mod access;
pub mod bucket;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/bucket", bucket::router(state.clone()))
        .nest("/access", access::router(state.clone()))
        .with_state(state)
}

/// JSON body of every failed lifecycle call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Protocol status code, e.g. `AlreadyExists`
    pub code: String,
    pub message: String,
}

pub fn status_for(code: Code) -> StatusCode {
    match code {
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn provision_error_response(err: &ProvisionError) -> Response {
    let code = err.code();
    let body = ErrorBody {
        code: code.to_string(),
        message: err.to_string(),
    };
    (status_for(code), Json(body)).into_response()
}
