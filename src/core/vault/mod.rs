//! Vault client adapter.
//!
//! The rotation state machine depends only on this interface, never on a
//! concrete vault SDK. The four operations are the only way rotation touches
//! stored secret state, and the two mutating ones are the crate's sole
//! concurrency-safety mechanisms: a conditional put keyed by request token
//! and an atomic staging-label move. Handlers never read-modify-write label
//! state around them.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `VaultClient` trait against the vault's SDK
//! 2. Map the vault's conditional-write and label-move failures onto
//!    `Error::VersionConflict` / `Error::StaleVersion`
//! 3. Plug the client into `Rotator::new`

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::core::config::GenerationPolicy;
use crate::core::types::{CredentialPayload, StagingLabel, VersionedSecret};
use crate::error::Result;

mod memory;

pub use memory::InMemoryVault;

/// Narrow interface to the managed secret vault.
pub trait VaultClient: Send + Sync {
    /// Generate a random credential value satisfying the policy.
    ///
    /// # Errors
    ///
    /// Returns `Error::Generation` when the constraints are unsatisfiable.
    fn generate_random_secret(&self, policy: &GenerationPolicy) -> Result<Zeroizing<String>>;

    /// Read the version currently holding `label`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no version holds the label.
    fn get_secret_version(&self, secret_id: &str, label: StagingLabel) -> Result<VersionedSecret>;

    /// Conditionally write a new version keyed by `request_token`.
    ///
    /// The token doubles as the version id, making retries safe: writing the
    /// same token with an identical value succeeds silently without creating
    /// a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `Error::VersionConflict` if the token already maps to a
    /// different value.
    fn put_secret_version(
        &self,
        secret_id: &str,
        value: &CredentialPayload,
        labels: &[StagingLabel],
        request_token: &str,
    ) -> Result<()>;

    /// Atomically move `label` from one version to another.
    ///
    /// The vault guarantees no window in which zero or two versions hold the
    /// label. When `label` is `Current`, the vault additionally demotes the
    /// displaced version to `Previous`, fully deprecates the old `Previous`,
    /// and clears `Pending` from the promoted version. Pass
    /// `from_version: None` when no version holds the label yet (first
    /// rotation).
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleVersion` if `from_version` no longer holds the
    /// label (concurrent rotation detected).
    fn move_staging_label(
        &self,
        secret_id: &str,
        label: StagingLabel,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()>;
}

impl<V: VaultClient + ?Sized> VaultClient for Arc<V> {
    fn generate_random_secret(&self, policy: &GenerationPolicy) -> Result<Zeroizing<String>> {
        (**self).generate_random_secret(policy)
    }

    fn get_secret_version(&self, secret_id: &str, label: StagingLabel) -> Result<VersionedSecret> {
        (**self).get_secret_version(secret_id, label)
    }

    fn put_secret_version(
        &self,
        secret_id: &str,
        value: &CredentialPayload,
        labels: &[StagingLabel],
        request_token: &str,
    ) -> Result<()> {
        (**self).put_secret_version(secret_id, value, labels, request_token)
    }

    fn move_staging_label(
        &self,
        secret_id: &str,
        label: StagingLabel,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        (**self).move_staging_label(secret_id, label, to_version, from_version)
    }
}
