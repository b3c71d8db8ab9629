//! Core rotation types.
//!
//! Staging labels, credential payloads, and the versioned-secret pair
//! returned by the vault adapter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a secret version in the rotation lifecycle.
///
/// The vault stores these as free-form labels; modeling them as an enum keeps
/// the one-holder-per-label invariant checkable. A version carrying no label
/// is deprecated and eligible for garbage collection by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagingLabel {
    /// The version currently trusted for production use.
    #[serde(rename = "CURRENT")]
    Current,
    /// The in-flight rotation candidate.
    #[serde(rename = "PENDING")]
    Pending,
    /// Last known good, retained for rollback.
    #[serde(rename = "PREVIOUS")]
    Previous,
}

impl StagingLabel {
    /// Wire representation of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingLabel::Current => "CURRENT",
            StagingLabel::Pending => "PENDING",
            StagingLabel::Previous => "PREVIOUS",
        }
    }
}

impl fmt::Display for StagingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured credential value stored in a secret version.
///
/// `auth_master_key` is the rotated field; everything else (connection
/// metadata, endpoints, usernames) passes through rotation unchanged via the
/// flattened map.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialPayload {
    /// The credential being rotated.
    #[serde(rename = "authMasterKey")]
    pub auth_master_key: String,
    /// Fields preserved verbatim from the prior version.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl CredentialPayload {
    /// Payload holding only the rotated credential.
    pub fn new(auth_master_key: impl Into<String>) -> Self {
        Self {
            auth_master_key: auth_master_key.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Clone this payload with the rotated field replaced.
    ///
    /// Metadata fields carry over unchanged so connection details survive
    /// rotation.
    pub fn rotated(&self, new_key: &str) -> Self {
        Self {
            auth_master_key: new_key.to_string(),
            metadata: self.metadata.clone(),
        }
    }
}

// Keep credential material out of logs and panic messages.
impl fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("auth_master_key", &"<redacted>")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// A secret version as read back from the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSecret {
    /// Vault-assigned version id (equal to the request token for versions
    /// written by rotation).
    pub version_id: String,
    /// The version's immutable credential value.
    pub value: CredentialPayload,
}
