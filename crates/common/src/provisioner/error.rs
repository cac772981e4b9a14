use std::fmt;
use std::time::Duration;

use crate::iam::CodecError;
use crate::store::StoreError;

/// Protocol status code a lifecycle error surfaces as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    InvalidArgument,
    AlreadyExists,
    Aborted,
    Unavailable,
    DeadlineExceeded,
    Internal,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Code::InvalidArgument => "InvalidArgument",
            Code::AlreadyExists => "AlreadyExists",
            Code::Aborted => "Aborted",
            Code::Unavailable => "Unavailable",
            Code::DeadlineExceeded => "DeadlineExceeded",
            Code::Internal => "Internal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// A required request field is empty or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The bucket exists and belongs to someone else
    #[error("bucket already exists: {0}")]
    AlreadyExists(String),
    /// The persisted identity document could not be decoded
    #[error(transparent)]
    MalformedDocument(#[from] CodecError),
    /// The identity document was deleted between read and write
    #[error("identity document vanished during update")]
    DocumentVanished,
    /// Every compare-and-swap attempt lost to a concurrent writer
    #[error("gave up after {attempts} conflicting attempts")]
    Conflict { attempts: u32 },
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    /// Backend store failure
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProvisionError {
    pub fn code(&self) -> Code {
        match self {
            ProvisionError::InvalidArgument(_) => Code::InvalidArgument,
            ProvisionError::AlreadyExists(_) => Code::AlreadyExists,
            ProvisionError::MalformedDocument(_) => Code::Internal,
            ProvisionError::DocumentVanished => Code::Aborted,
            ProvisionError::Conflict { .. } => Code::Aborted,
            ProvisionError::DeadlineExceeded(_) => Code::DeadlineExceeded,
            ProvisionError::Store(StoreError::Unavailable(_)) => Code::Unavailable,
            ProvisionError::Store(_) => Code::Internal,
            ProvisionError::Internal(_) => Code::Internal,
        }
    }
}
