//! Bucket-scoped actions as recorded in an identity's grant list.
//!
//! The identity document stores grants as plain strings of the form
//! `<Verb>:<BucketName>` (e.g. `Read:my-bucket`). Global grants without a
//! bucket suffix (e.g. `Admin`) may also appear in documents written by
//! other tools; they are carried through untouched.

use std::fmt;
use std::str::FromStr;

/// Separator between the verb and the bucket name in a grant string.
pub const SCOPE_SEPARATOR: char = ':';

/// The verbs a grant can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Write,
    List,
    Tagging,
    Admin,
}

impl Verb {
    /// The verbs handed to every account granted access to a bucket.
    pub const BUCKET_ACCESS: [Verb; 4] = [Verb::Read, Verb::Write, Verb::List, Verb::Tagging];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Read => "Read",
            Verb::Write => "Write",
            Verb::List => "List",
            Verb::Tagging => "Tagging",
            Verb::Admin => "Admin",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(Verb::Read),
            "Write" => Ok(Verb::Write),
            "List" => Ok(Verb::List),
            "Tagging" => Ok(Verb::Tagging),
            "Admin" => Ok(Verb::Admin),
            other => Err(ActionError::UnknownVerb(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action verb: {0}")]
    UnknownVerb(String),
    #[error("action is not scoped to a bucket: {0}")]
    Unscoped(String),
}

/// A verb scoped to a single bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    pub verb: Verb,
    pub bucket: String,
}

impl Action {
    pub fn new(verb: Verb, bucket: impl Into<String>) -> Self {
        Self {
            verb,
            bucket: bucket.into(),
        }
    }

    /// The fixed action set granted on bucket access, scoped to `bucket`.
    pub fn bucket_access(bucket: &str) -> Vec<Action> {
        Verb::BUCKET_ACCESS
            .iter()
            .map(|verb| Action::new(*verb, bucket))
            .collect()
    }

    /// Returns the bucket a raw grant string is scoped to, if any.
    pub fn scope_of(raw: &str) -> Option<&str> {
        raw.split_once(SCOPE_SEPARATOR)
            .map(|(_, bucket)| bucket)
            .filter(|bucket| !bucket.is_empty())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.verb, SCOPE_SEPARATOR, self.bucket)
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, bucket) = s
            .split_once(SCOPE_SEPARATOR)
            .filter(|(_, bucket)| !bucket.is_empty())
            .ok_or_else(|| ActionError::Unscoped(s.to_string()))?;
        Ok(Action::new(verb.parse()?, bucket))
    }
}
