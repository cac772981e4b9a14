//! Path-addressed blob storage backing the identity document and bucket
//! entries.
//!
//! Entries are addressed by a `(directory, name)` pair, mirroring a filer's
//! directory listing. Every write returns an opaque [`Version`] that can be
//! handed back to [`DirectoryStore::update_if_unchanged`] to make a
//! read-modify-write safe against concurrent writers.

use async_trait::async_trait;
use bytes::Bytes;

mod memory;
mod object;

pub use memory::MemoryDirectoryStore;
pub use object::{ObjectDirectoryStore, StoreConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The entry does not exist
    #[error("entry not found: {0}")]
    NotFound(String),
    /// A create found an entry already in place
    #[error("entry already exists: {0}")]
    AlreadyExists(String),
    /// A conditional update found a different version than expected
    #[error("entry changed concurrently: {0}")]
    Conflict(String),
    /// The backend cannot perform the requested operation
    #[error("operation not supported by backend: {0}")]
    Unsupported(String),
    /// Transport or backend failure
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// The backend could not be set up from its configuration
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// Opaque version token of a stored entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

impl Version {
    pub fn from_e_tag(e_tag: impl Into<String>) -> Self {
        Self {
            e_tag: Some(e_tag.into()),
            version: None,
        }
    }
}

/// The content of an entry together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub content: Bytes,
    pub version: Version,
}

#[async_trait]
pub trait DirectoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read an entry. A missing entry is `Ok(None)`, not an error.
    async fn lookup(&self, directory: &str, name: &str) -> Result<Option<Entry>, StoreError>;

    /// Create an entry that must not exist yet.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if it does.
    async fn create(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError>;

    /// Overwrite an existing entry unconditionally.
    ///
    /// Fails with [`StoreError::NotFound`] if the entry is gone.
    async fn update(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError>;

    /// Overwrite an existing entry only if it is still at `expected`.
    ///
    /// Fails with [`StoreError::Conflict`] on a version mismatch and with
    /// [`StoreError::NotFound`] if the entry is gone.
    async fn update_if_unchanged(
        &self,
        directory: &str,
        name: &str,
        expected: &Version,
        content: Bytes,
    ) -> Result<Version, StoreError>;

    /// Remove an entry.
    ///
    /// Fails with [`StoreError::NotFound`] if there is nothing to remove.
    async fn delete(&self, directory: &str, name: &str) -> Result<(), StoreError>;
}

/// Join a directory and entry name into a slash-separated key without
/// leading or trailing separators.
pub(crate) fn entry_key(directory: &str, name: &str) -> String {
    let directory = directory.trim_matches('/');
    let name = name.trim_matches('/');
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", directory, name)
    }
}
