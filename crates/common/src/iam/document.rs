//! The identity document and its persisted JSON form.
//!
//! The document lives as a single blob in the directory store. Its textual
//! form is the indented JSON rendering of the S3 API configuration:
//!
//! ```json
//! {
//!   "identities": [
//!     {
//!       "name": "alice",
//!       "credentials": [{ "accessKey": "...", "secretKey": "..." }],
//!       "actions": ["Read:photos", "Write:photos"]
//!     }
//!   ]
//! }
//! ```
//!
//! Identities keep their insertion order so that encoding an unchanged
//! document is byte-stable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::credential::Credential;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The persisted bytes are not a valid identity document
    #[error("malformed identity document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
    /// Two identity records share a name
    #[error("malformed identity document: duplicate identity '{0}'")]
    DuplicateIdentity(String),
}

/// A named principal with its credentials and granted actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    /// Grant strings, unique within the identity, in first-insertion order
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credentials: Vec::new(),
            actions: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    pub fn has_credential(&self, credential: &Credential) -> bool {
        self.credentials.iter().any(|c| c.same_keys(credential))
    }
}

/// Every account known to the backend, as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDocument {
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityDocument {
    /// Decode the persisted form.
    ///
    /// An empty (or all-whitespace) blob is an empty document: a file that
    /// does not exist yet and a file that exists with no content look the
    /// same to callers.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let document: IdentityDocument = serde_json::from_slice(bytes)?;

        let mut seen = HashSet::with_capacity(document.identities.len());
        for identity in &document.identities {
            if !seen.insert(identity.name.as_str()) {
                return Err(CodecError::DuplicateIdentity(identity.name.clone()));
            }
        }

        Ok(document)
    }

    /// Encode to the persisted form. Deterministic for a given document.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn identity(&self, name: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.name == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.identities.iter().position(|i| i.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEAWEED_IDENTITY_JSON: &str = r#"{
  "identities": [
    {
      "name": "admin",
      "credentials": [
        {
          "accessKey": "EOE7FYCNOBZJ5VFV909G",
          "secretKey": "qmIqpWm8HxCzmynCrD6U6vKWi4hnDBndOnmxXNsV"
        }
      ],
      "actions": ["Admin", "Read", "Write"]
    },
    {
      "name": "alice",
      "credentials": [],
      "actions": ["Read:photos"],
      "account": { "id": "alice", "displayName": "Alice" }
    }
  ],
  "accounts": [{ "id": "alice", "displayName": "Alice" }]
}"#;

    #[test]
    fn test_decode_empty_is_empty_document() {
        assert!(IdentityDocument::decode(b"").unwrap().is_empty());
        assert!(IdentityDocument::decode(b" \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_seaweed_document() {
        let doc = IdentityDocument::decode(SEAWEED_IDENTITY_JSON.as_bytes()).unwrap();
        assert_eq!(doc.identities.len(), 2);

        let admin = doc.identity("admin").unwrap();
        assert_eq!(admin.credentials[0].access_key, "EOE7FYCNOBZJ5VFV909G");
        assert!(admin.has_action("Admin"));

        let alice = doc.identity("alice").unwrap();
        assert!(alice.credentials.is_empty());
        assert!(alice.extra.contains_key("account"));
        assert!(doc.extra.contains_key("accounts"));
    }

    #[test]
    fn test_decode_malformed() {
        let err = IdentityDocument::decode(b"{\"identities\": [").unwrap_err();
        assert!(matches!(err, CodecError::MalformedDocument(_)));

        let err = IdentityDocument::decode(b"{\"identities\": {}}").unwrap_err();
        assert!(matches!(err, CodecError::MalformedDocument(_)));
    }

    #[test]
    fn test_decode_rejects_duplicate_names() {
        let raw = br#"{"identities":[{"name":"a"},{"name":"a"}]}"#;
        let err = IdentityDocument::decode(raw).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateIdentity(name) if name == "a"));
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields() {
        let doc = IdentityDocument::decode(SEAWEED_IDENTITY_JSON.as_bytes()).unwrap();
        let encoded = doc.encode().unwrap();
        let decoded = IdentityDocument::decode(&encoded).unwrap();
        assert_eq!(decoded, doc);
        assert!(String::from_utf8(encoded).unwrap().contains("displayName"));
    }

    #[test]
    fn test_encode_is_byte_stable() {
        let doc = IdentityDocument::decode(SEAWEED_IDENTITY_JSON.as_bytes()).unwrap();
        let first = doc.encode().unwrap();
        let second = IdentityDocument::decode(&first).unwrap().encode().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, doc.encode().unwrap());
    }

    #[test]
    fn test_identity_order_is_insertion_order() {
        let mut doc = IdentityDocument::default();
        doc.identities.push(Identity::new("zed"));
        doc.identities.push(Identity::new("amy"));
        let decoded = IdentityDocument::decode(&doc.encode().unwrap()).unwrap();
        let names: Vec<_> = decoded.identities.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["zed", "amy"]);
    }
}
