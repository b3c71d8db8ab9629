//! Step handlers.
//!
//! Each handler runs to completion against the vault adapter and the target
//! updater, holds no state of its own, and leans on two vault primitives for
//! all concurrency safety: the conditional put keyed by request token and the
//! atomic label move. No handler swallows a collaborator error.

use tracing::{debug, info};

use super::Rotator;
use crate::core::types::{CredentialPayload, StagingLabel};
use crate::error::{Error, Result};

impl Rotator {
    /// Materialize a new candidate credential as the `PENDING` version.
    ///
    /// Fields other than the rotated credential are cloned from the
    /// `CURRENT` version so connection metadata survives rotation. Safe to
    /// re-invoke: once a `PENDING` version exists under this token, further
    /// calls return without generating anything.
    ///
    /// # Errors
    ///
    /// `Error::Generation` if no candidate satisfying the policy could be
    /// produced, `Error::VersionConflict` if the token already maps to a
    /// divergent value (never suppressed here).
    pub fn create_secret(&self, secret_id: &str, request_token: &str) -> Result<()> {
        match self.vault.get_secret_version(secret_id, StagingLabel::Pending) {
            Ok(pending) if pending.version_id == request_token => {
                debug!(
                    secret = secret_id,
                    token = request_token,
                    "pending candidate already exists, nothing to create"
                );
                return Ok(());
            }
            // A pending version under another token belongs to an earlier
            // attempt; writing this token's candidate supersedes it.
            Ok(_) | Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let candidate = self.vault.generate_random_secret(&self.config.generation)?;

        let payload = match self.vault.get_secret_version(secret_id, StagingLabel::Current) {
            Ok(current) => current.value.rotated(&candidate),
            Err(Error::NotFound { .. }) => CredentialPayload::new(candidate.as_str()),
            Err(e) => return Err(e),
        };

        self.vault.put_secret_version(
            secret_id,
            &payload,
            &[StagingLabel::Pending],
            request_token,
        )?;

        info!(
            secret = secret_id,
            token = request_token,
            "staged pending candidate version"
        );
        Ok(())
    }

    /// Push the `PENDING` credential into the target resource.
    ///
    /// Delegates to the pluggable updater, which authenticates with admin
    /// credentials and owns identity creation when the target identity does
    /// not exist yet. Mutates external state only; the vault's versions are
    /// untouched, so the orchestrator may retry on `Error::Apply` freely.
    pub fn set_secret(&self, secret_id: &str) -> Result<()> {
        let pending = self
            .vault
            .get_secret_version(secret_id, StagingLabel::Pending)?;

        self.target.apply(&pending.value)?;

        info!(
            secret = secret_id,
            version = %pending.version_id,
            "applied pending credential to target resource"
        );
        Ok(())
    }

    /// Confirm the `PENDING` credential actually works before promotion.
    ///
    /// Exercises the configured access level against the target. Never moves
    /// a staging label: on `Error::Validation` the secret stays pending and
    /// unverified, safe to retry after remediation.
    pub fn test_secret(&self, secret_id: &str) -> Result<()> {
        let pending = self
            .vault
            .get_secret_version(secret_id, StagingLabel::Pending)?;

        self.target.verify(&pending.value, self.config.access_level)?;

        info!(
            secret = secret_id,
            version = %pending.version_id,
            access = ?self.config.access_level,
            "pending credential verified against target resource"
        );
        Ok(())
    }

    /// Atomically promote the candidate version to `CURRENT`.
    ///
    /// Captures the current holder of `CURRENT` and hands the vault an
    /// atomic label move anchored on it; the vault demotes the displaced
    /// version to `PREVIOUS`. If `CURRENT` already sits on the token's
    /// version the promotion happened on an earlier invocation and this one
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// `Error::StaleVersion` when the captured holder no longer matches the
    /// vault's state (concurrent rotation); the orchestrator re-fetches and
    /// retries.
    pub fn finish_secret(&self, secret_id: &str, request_token: &str) -> Result<()> {
        let from_version = match self.vault.get_secret_version(secret_id, StagingLabel::Current) {
            Ok(current) => {
                if current.version_id == request_token {
                    debug!(
                        secret = secret_id,
                        token = request_token,
                        "promotion already finished"
                    );
                    return Ok(());
                }
                Some(current.version_id)
            }
            // First rotation of a freshly created secret.
            Err(Error::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        self.vault.move_staging_label(
            secret_id,
            StagingLabel::Current,
            request_token,
            from_version.as_deref(),
        )?;

        info!(
            secret = secret_id,
            token = request_token,
            demoted = ?from_version,
            "promoted pending version to current"
        );
        Ok(())
    }
}
