//! Test support utilities for rekey integration tests.
//!
//! Provides a reusable rotation environment plus vault/target doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rekey::core::config::{GenerationPolicy, RotationConfig};
use rekey::core::rotation::{RotationRequest, Rotator};
use rekey::core::target::{AccessLevel, TargetResource};
use rekey::core::types::{CredentialPayload, StagingLabel, VersionedSecret};
use rekey::core::vault::{InMemoryVault, VaultClient};
use rekey::error::{Error, Result};

/// Install a tracing subscriber honoring `REKEY_LOG`, once per process.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_env("REKEY_LOG").unwrap_or_else(|_| EnvFilter::new("rekey=warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .try_init();
}

/// Rotation environment with shared handles on the vault and target doubles.
///
/// The rotator owns boxed trait objects; `Arc` clones let tests inspect the
/// same underlying state after the fact.
pub struct Test {
    pub vault: Arc<InMemoryVault>,
    pub target: Arc<RecordingTarget>,
    pub rotator: Rotator,
}

impl Test {
    /// Environment with an empty vault and default configuration.
    pub fn new() -> Self {
        Self::with_config(RotationConfig::default())
    }

    pub fn with_config(config: RotationConfig) -> Self {
        init_tracing();

        let vault = Arc::new(InMemoryVault::new());
        let target = Arc::new(RecordingTarget::new());
        let rotator = Rotator::new(
            Box::new(Arc::clone(&vault)),
            Box::new(Arc::clone(&target)),
        )
        .with_config(config);

        Self {
            vault,
            target,
            rotator,
        }
    }

    /// Environment with one secret already holding a `CURRENT` version.
    pub fn seeded(secret_id: &str, version_id: &str, auth_master_key: &str) -> Self {
        let t = Self::new();
        t.vault
            .seed(secret_id, version_id, CredentialPayload::new(auth_master_key));
        t
    }

    // Step helpers, each a full dispatch through the rotator.

    pub fn create(&self, secret_id: &str, token: &str) -> Result<()> {
        self.rotator
            .handle(&RotationRequest::new("createSecret", secret_id, token))
    }

    pub fn set(&self, secret_id: &str, token: &str) -> Result<()> {
        self.rotator
            .handle(&RotationRequest::new("setSecret", secret_id, token))
    }

    pub fn test_step(&self, secret_id: &str, token: &str) -> Result<()> {
        self.rotator
            .handle(&RotationRequest::new("testSecret", secret_id, token))
    }

    pub fn finish(&self, secret_id: &str, token: &str) -> Result<()> {
        self.rotator
            .handle(&RotationRequest::new("finishSecret", secret_id, token))
    }

    /// Run the four steps in orchestrator order.
    pub fn rotate(&self, secret_id: &str, token: &str) -> Result<()> {
        self.create(secret_id, token)?;
        self.set(secret_id, token)?;
        self.test_step(secret_id, token)?;
        self.finish(secret_id, token)
    }

    pub fn labels(&self, secret_id: &str) -> HashMap<StagingLabel, String> {
        self.vault.labels(secret_id)
    }

    pub fn pending_key(&self, secret_id: &str, token: &str) -> String {
        self.vault
            .value_of(secret_id, token)
            .expect("pending version should exist")
            .auth_master_key
    }
}

/// Target double standing in for a real authentication backend.
///
/// Remembers which credentials were applied. Verification succeeds only for
/// a credential previously applied, mirroring a backend that accepts only
/// keys actually provisioned on it.
pub struct RecordingTarget {
    applied: Mutex<Vec<String>>,
    pub fail_apply: AtomicBool,
    pub fail_verify: AtomicBool,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            fail_apply: AtomicBool::new(false),
            fail_verify: AtomicBool::new(false),
        }
    }

    /// Credentials provisioned on the backend, in apply order.
    pub fn applied_keys(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

impl TargetResource for RecordingTarget {
    fn apply(&self, pending: &CredentialPayload) -> Result<()> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(Error::Apply("target unreachable".to_string()));
        }
        let mut applied = self.applied.lock().unwrap();
        // Re-applying the same credential is a no-op.
        if !applied.contains(&pending.auth_master_key) {
            applied.push(pending.auth_master_key.clone());
        }
        Ok(())
    }

    fn verify(&self, pending: &CredentialPayload, _access: AccessLevel) -> Result<()> {
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(Error::Validation("verification refused".to_string()));
        }
        if !self
            .applied
            .lock()
            .unwrap()
            .contains(&pending.auth_master_key)
        {
            return Err(Error::Validation(
                "credential not provisioned on target".to_string(),
            ));
        }
        Ok(())
    }
}

/// Vault wrapper counting every adapter call.
pub struct CountingVault {
    pub inner: Arc<InMemoryVault>,
    pub calls: AtomicUsize,
}

impl CountingVault {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InMemoryVault::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VaultClient for CountingVault {
    fn generate_random_secret(
        &self,
        policy: &GenerationPolicy,
    ) -> Result<zeroize::Zeroizing<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_random_secret(policy)
    }

    fn get_secret_version(&self, secret_id: &str, label: StagingLabel) -> Result<VersionedSecret> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_secret_version(secret_id, label)
    }

    fn put_secret_version(
        &self,
        secret_id: &str,
        value: &CredentialPayload,
        labels: &[StagingLabel],
        request_token: &str,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .put_secret_version(secret_id, value, labels, request_token)
    }

    fn move_staging_label(
        &self,
        secret_id: &str,
        label: StagingLabel,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .move_staging_label(secret_id, label, to_version, from_version)
    }
}

/// Vault wrapper serving an outdated `CURRENT` read.
///
/// Simulates a concurrent rotation sneaking in between the finish step's
/// read of `CURRENT` and its label move: reads report `stale_current`, while
/// mutations hit the real vault and see its actual state.
pub struct StaleReadVault {
    pub inner: Arc<InMemoryVault>,
    pub stale_current: String,
}

impl VaultClient for StaleReadVault {
    fn generate_random_secret(
        &self,
        policy: &GenerationPolicy,
    ) -> Result<zeroize::Zeroizing<String>> {
        self.inner.generate_random_secret(policy)
    }

    fn get_secret_version(&self, secret_id: &str, label: StagingLabel) -> Result<VersionedSecret> {
        if label == StagingLabel::Current {
            return Ok(VersionedSecret {
                version_id: self.stale_current.clone(),
                value: CredentialPayload::new("stale"),
            });
        }
        self.inner.get_secret_version(secret_id, label)
    }

    fn put_secret_version(
        &self,
        secret_id: &str,
        value: &CredentialPayload,
        labels: &[StagingLabel],
        request_token: &str,
    ) -> Result<()> {
        self.inner
            .put_secret_version(secret_id, value, labels, request_token)
    }

    fn move_staging_label(
        &self,
        secret_id: &str,
        label: StagingLabel,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        self.inner
            .move_staging_label(secret_id, label, to_version, from_version)
    }
}
