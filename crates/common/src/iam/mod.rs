//! The identity/policy document shared by every account on the backend.
//!
//! - [`IdentityDocument`]: the persisted record of all identities, with its
//!   JSON codec
//! - [`Credential`]: access/secret key pairs and their generation
//! - [`Action`]: bucket-scoped grants
//! - reconciliation: [`IdentityDocument::grant`], [`IdentityDocument::revoke`]
//!   and [`IdentityDocument::revoke_bucket`]

mod action;
mod credential;
mod document;
mod reconcile;

pub use action::{Action, ActionError, Verb, SCOPE_SEPARATOR};
pub use credential::{Credential, ACCESS_KEY_LEN, SECRET_KEY_LEN};
pub use document::{CodecError, Identity, IdentityDocument};
pub use reconcile::{GrantOutcome, RevokeOutcome};

/// Directory holding the identity document in the backend store
pub const IAM_CONFIG_DIRECTORY: &str = "/etc/iam";
/// File name of the identity document within [`IAM_CONFIG_DIRECTORY`]
pub const IAM_IDENTITY_FILE: &str = "identity.json";
