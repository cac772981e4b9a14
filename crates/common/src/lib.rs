/**
 * The identity/policy document shared by all accounts.
 *  - JSON codec for the persisted form
 *  - Credential generation
 *  - Idempotent grant/revoke reconciliation
 */
pub mod iam;
/**
 * Bucket lifecycle operations composed from the
 *  directory store, the codec and the reconciler.
 * This is what a transport exposes.
 */
pub mod provisioner;
/**
 * Path-addressed blob storage backing the identity
 *  document and bucket entries, with in-memory and
 *  object-store implementations.
 */
pub mod store;
/**
 * Fault injection for exercising failure and
 *  retry paths in tests.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::iam::{Action, Credential, Identity, IdentityDocument};
    pub use crate::provisioner::{
        Code, IdentityProvisioner, ProvisionError, Provisioner, ProvisionerConfig, RevokeScope,
    };
    pub use crate::store::{DirectoryStore, MemoryDirectoryStore, ObjectDirectoryStore, StoreConfig};
}
