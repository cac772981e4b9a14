//! S3 credential pairs and their generation.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Length of a generated access key id
pub const ACCESS_KEY_LEN: usize = 20;
/// Length of a generated secret access key
pub const SECRET_KEY_LEN: usize = 40;

const ACCESS_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SECRET_KEY_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// An access key / secret key pair attached to an identity.
///
/// Unknown fields carried over from the persisted document are kept in
/// `extra` so a read-modify-write never drops them.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            extra: Map::new(),
        }
    }

    /// Generate a fresh pair from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self::new(
            random_string(&mut rng, ACCESS_KEY_CHARSET, ACCESS_KEY_LEN),
            random_string(&mut rng, SECRET_KEY_CHARSET, SECRET_KEY_LEN),
        )
    }

    /// Whether both halves of the pair are present.
    pub fn is_complete(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    pub fn same_keys(&self, other: &Credential) -> bool {
        self.access_key == other.access_key && self.secret_key == other.secret_key
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.same_keys(other) && self.extra == other.extra
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn random_string<R: Rng>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_lengths_and_charset() {
        let credential = Credential::generate();
        assert_eq!(credential.access_key.len(), ACCESS_KEY_LEN);
        assert_eq!(credential.secret_key.len(), SECRET_KEY_LEN);
        assert!(credential
            .access_key
            .bytes()
            .all(|b| ACCESS_KEY_CHARSET.contains(&b)));
        assert!(credential
            .secret_key
            .bytes()
            .all(|b| SECRET_KEY_CHARSET.contains(&b)));
        assert!(credential.is_complete());
    }

    #[test]
    fn test_generated_pairs_differ() {
        let a = Credential::generate();
        let b = Credential::generate();
        assert!(!a.same_keys(&b));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("AKID", "very-secret");
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("very-secret"));
    }
}
