use axum::routing::post;
use axum::Router;

pub mod grant;
pub mod revoke;

pub use grant::{GrantError, GrantRequest};
pub use revoke::{RevokeError, RevokeRequest};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/grant", post(grant::handler))
        .route("/revoke", post(revoke::handler))
        .with_state(state)
}
