use axum::routing::post;
use axum::Router;

pub mod create;
pub mod delete;

pub use create::{CreateError, CreateRequest};
pub use delete::{DeleteError, DeleteRequest};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/delete", post(delete::handler))
        .with_state(state)
}
