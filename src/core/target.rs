//! Target-resource updater.
//!
//! Pluggable capability that pushes a pending credential into the real
//! authentication backend (database, API, ...) and verifies it works. The
//! rotation handlers never branch on resource type; deployments select an
//! implementation by configuration and plug it into the [`Rotator`].
//!
//! Implementations must authenticate with elevated administrative
//! credentials, never with the secret being rotated.
//!
//! [`Rotator`]: crate::core::rotation::Rotator

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::core::types::CredentialPayload;
use crate::error::Result;

/// Access pattern exercised when validating a pending credential.
///
/// Matches what the eventual consumer of the secret will do against the
/// target resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    #[default]
    ReadOnly,
    ReadWrite,
}

/// Capability interface to the external system whose credential is rotated.
pub trait TargetResource: Send + Sync {
    /// Apply the pending credential to the target resource.
    ///
    /// If the target identity does not exist yet, the implementation creates
    /// it and clones permission grants from the prior identity so continuity
    /// of authorization is preserved. Applying the same pending value twice
    /// must be a safe no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::Apply` if the target resource is unreachable or
    /// rejects the update. The vault-stored versions are unaffected, so the
    /// orchestrator may retry freely.
    fn apply(&self, pending: &CredentialPayload) -> Result<()>;

    /// Verify the pending credential actually works against the target.
    ///
    /// Exercises the same access pattern the eventual consumer will use,
    /// at the given access level.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the credential is rejected.
    fn verify(&self, pending: &CredentialPayload, access: AccessLevel) -> Result<()>;
}

impl<T: TargetResource + ?Sized> TargetResource for Arc<T> {
    fn apply(&self, pending: &CredentialPayload) -> Result<()> {
        (**self).apply(pending)
    }

    fn verify(&self, pending: &CredentialPayload, access: AccessLevel) -> Result<()> {
        (**self).verify(pending, access)
    }
}

/// Default stub updater.
///
/// The concrete update logic is application-specific, so out of the box the
/// set and test steps succeed without touching any external system.
/// Deployments that rotate a real backend plug in their own implementation.
#[derive(Debug, Default)]
pub struct NoopTarget;

impl TargetResource for NoopTarget {
    fn apply(&self, _pending: &CredentialPayload) -> Result<()> {
        debug!("noop target: skipping credential apply");
        Ok(())
    }

    fn verify(&self, _pending: &CredentialPayload, access: AccessLevel) -> Result<()> {
        debug!(?access, "noop target: skipping credential verify");
        Ok(())
    }
}
