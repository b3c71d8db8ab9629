//! In-memory vault.
//!
//! Faithful reference implementation of the adapter contract, used by tests
//! and local development. Label state is an explicit `StagingLabel` → version
//! slot map per secret, so the one-holder-per-label invariant holds by
//! construction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::VaultClient;
use crate::core::config::GenerationPolicy;
use crate::core::types::{CredentialPayload, StagingLabel, VersionedSecret};
use crate::error::{Error, Result};

struct Version {
    value: CredentialPayload,
    #[allow(dead_code)]
    created: DateTime<Utc>,
}

#[derive(Default)]
struct SecretRecord {
    /// Version id → immutable value. Ids are request tokens for versions
    /// written by rotation.
    versions: BTreeMap<String, Version>,
    /// Label slots. At most one version id per label.
    labels: HashMap<StagingLabel, String>,
}

/// Mutex-guarded vault holding secrets entirely in memory.
#[derive(Default)]
pub struct InMemoryVault {
    secrets: Mutex<HashMap<String, SecretRecord>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a version and label it `CURRENT`, as if a prior rotation had
    /// completed.
    pub fn seed(&self, secret_id: &str, version_id: &str, value: CredentialPayload) {
        let mut secrets = self.secrets.lock().unwrap();
        let record = secrets.entry(secret_id.to_string()).or_default();
        record.versions.insert(
            version_id.to_string(),
            Version {
                value,
                created: Utc::now(),
            },
        );
        record
            .labels
            .insert(StagingLabel::Current, version_id.to_string());
    }

    /// Snapshot of the label slots for a secret.
    pub fn labels(&self, secret_id: &str) -> HashMap<StagingLabel, String> {
        let secrets = self.secrets.lock().unwrap();
        secrets
            .get(secret_id)
            .map(|r| r.labels.clone())
            .unwrap_or_default()
    }

    /// All version ids stored for a secret.
    pub fn version_ids(&self, secret_id: &str) -> Vec<String> {
        let secrets = self.secrets.lock().unwrap();
        secrets
            .get(secret_id)
            .map(|r| r.versions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Value of a specific version, if it exists.
    pub fn value_of(&self, secret_id: &str, version_id: &str) -> Option<CredentialPayload> {
        let secrets = self.secrets.lock().unwrap();
        secrets
            .get(secret_id)
            .and_then(|r| r.versions.get(version_id))
            .map(|v| v.value.clone())
    }
}

impl VaultClient for InMemoryVault {
    fn generate_random_secret(&self, policy: &GenerationPolicy) -> Result<Zeroizing<String>> {
        let classes = policy.included_classes();
        if classes.is_empty() {
            return Err(Error::Generation(
                "every character class is excluded".to_string(),
            ));
        }
        if policy.length == 0 {
            return Err(Error::Generation("length must be at least 1".to_string()));
        }
        if policy.require_each_class && policy.length < classes.len() {
            return Err(Error::Generation(format!(
                "length {} cannot cover {} required character classes",
                policy.length,
                classes.len()
            )));
        }

        let alphabet: Vec<u8> = classes
            .iter()
            .flat_map(|c| c.alphabet().bytes())
            .collect();

        let mut rng = rand::thread_rng();
        let mut out = Vec::with_capacity(policy.length);
        if policy.require_each_class {
            for class in &classes {
                let chars = class.alphabet().as_bytes();
                out.push(chars[rng.gen_range(0..chars.len())]);
            }
        }
        while out.len() < policy.length {
            out.push(alphabet[rng.gen_range(0..alphabet.len())]);
        }
        out.shuffle(&mut rng);

        // Alphabets are pure ASCII.
        Ok(Zeroizing::new(String::from_utf8_lossy(&out).into_owned()))
    }

    fn get_secret_version(&self, secret_id: &str, label: StagingLabel) -> Result<VersionedSecret> {
        let secrets = self.secrets.lock().unwrap();
        let not_found = || Error::NotFound {
            secret_id: secret_id.to_string(),
            label,
        };

        let record = secrets.get(secret_id).ok_or_else(not_found)?;
        let version_id = record.labels.get(&label).ok_or_else(not_found)?;
        let version = record.versions.get(version_id).ok_or_else(not_found)?;

        debug!(secret = secret_id, %label, version = %version_id, "read secret version");
        Ok(VersionedSecret {
            version_id: version_id.clone(),
            value: version.value.clone(),
        })
    }

    fn put_secret_version(
        &self,
        secret_id: &str,
        value: &CredentialPayload,
        labels: &[StagingLabel],
        request_token: &str,
    ) -> Result<()> {
        let mut secrets = self.secrets.lock().unwrap();
        let record = secrets.entry(secret_id.to_string()).or_default();

        if let Some(existing) = record.versions.get(request_token) {
            if existing.value == *value {
                debug!(
                    secret = secret_id,
                    token = request_token,
                    "token already written with identical value, no-op"
                );
                return Ok(());
            }
            return Err(Error::VersionConflict {
                secret_id: secret_id.to_string(),
                token: request_token.to_string(),
            });
        }

        record.versions.insert(
            request_token.to_string(),
            Version {
                value: value.clone(),
                created: Utc::now(),
            },
        );
        for label in labels {
            record.labels.insert(*label, request_token.to_string());
        }

        info!(
            secret = secret_id,
            token = request_token,
            labels = ?labels.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            "wrote secret version"
        );
        Ok(())
    }

    fn move_staging_label(
        &self,
        secret_id: &str,
        label: StagingLabel,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        let mut secrets = self.secrets.lock().unwrap();
        let not_found = || Error::NotFound {
            secret_id: secret_id.to_string(),
            label,
        };

        let record = secrets.get_mut(secret_id).ok_or_else(not_found)?;
        if !record.versions.contains_key(to_version) {
            return Err(not_found());
        }

        let holder = record.labels.get(&label).cloned();
        if holder.as_deref() != from_version {
            return Err(Error::StaleVersion {
                secret_id: secret_id.to_string(),
                label,
            });
        }

        record.labels.insert(label, to_version.to_string());
        if label == StagingLabel::Current {
            // Old PREVIOUS is fully deprecated; the displaced CURRENT takes
            // its place. The promoted version stops being a candidate.
            record.labels.remove(&StagingLabel::Previous);
            if let Some(old) = holder.clone() {
                record.labels.insert(StagingLabel::Previous, old);
            }
            if record.labels.get(&StagingLabel::Pending).map(String::as_str) == Some(to_version) {
                record.labels.remove(&StagingLabel::Pending);
            }
        }

        info!(
            secret = secret_id,
            %label,
            to = to_version,
            from = ?from_version,
            "moved staging label"
        );
        Ok(())
    }
}
