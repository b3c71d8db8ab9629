//! Rotation state machine.
//!
//! The dispatcher and the four step handlers. An orchestrator invokes
//! [`Rotator::handle`] with `(step, secret id, request token)`; the dispatcher
//! routes to the matching handler and performs no business logic of its own.
//! Each invocation is a stateless activation: all rotation state lives in the
//! vault, and every step is safe to re-invoke any number of times.

use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

use crate::core::config::RotationConfig;
use crate::core::target::TargetResource;
use crate::core::vault::VaultClient;
use crate::error::Result;

mod steps;

/// The four lifecycle steps, invoked in order for one rotation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Set,
    Test,
    Finish,
}

impl Step {
    /// Exact-name lookup over the orchestrator's step vocabulary.
    ///
    /// Unknown names yield `None`; the dispatcher treats them as a no-op
    /// because the orchestrator's lifecycle may include steps this handler
    /// has nothing to do for.
    pub fn parse(name: &str) -> Option<Step> {
        match name {
            "createSecret" => Some(Step::Create),
            "setSecret" => Some(Step::Set),
            "testSecret" => Some(Step::Test),
            "finishSecret" => Some(Step::Finish),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Create => "createSecret",
            Step::Set => "setSecret",
            Step::Test => "testSecret",
            Step::Finish => "finishSecret",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One orchestrator invocation of the rotation handler.
///
/// Field names follow the orchestrator's wire format. `request_token` is the
/// idempotency key for the whole rotation attempt and doubles as the
/// candidate version's id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RotationRequest {
    #[serde(rename = "Step")]
    pub step: String,
    #[serde(rename = "SecretId")]
    pub secret_id: String,
    #[serde(rename = "ClientRequestToken")]
    pub request_token: String,
}

impl RotationRequest {
    pub fn new(
        step: impl Into<String>,
        secret_id: impl Into<String>,
        request_token: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            secret_id: secret_id.into(),
            request_token: request_token.into(),
        }
    }

    /// Parse the orchestrator's JSON invocation payload.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// The rotation handler: a vault client, a target-resource updater, and the
/// configuration that drives candidate generation and validation.
pub struct Rotator {
    vault: Box<dyn VaultClient>,
    target: Box<dyn TargetResource>,
    config: RotationConfig,
}

impl Rotator {
    /// Build a rotator with the default configuration.
    pub fn new(vault: Box<dyn VaultClient>, target: Box<dyn TargetResource>) -> Self {
        Self {
            vault,
            target,
            config: RotationConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RotationConfig) -> Self {
        self.config = config;
        self
    }

    /// Dispatch one orchestrator invocation to the matching step handler.
    ///
    /// Pure routing: unknown steps are ignored, everything else is delegated
    /// verbatim and errors are propagated untouched so the orchestrator owns
    /// retry policy.
    pub fn handle(&self, request: &RotationRequest) -> Result<()> {
        let Some(step) = Step::parse(&request.step) else {
            debug!(step = %request.step, secret = %request.secret_id, "unrecognized step, ignoring");
            return Ok(());
        };

        info!(%step, secret = %request.secret_id, "dispatching rotation step");
        match step {
            Step::Create => self.create_secret(&request.secret_id, &request.request_token),
            Step::Set => self.set_secret(&request.secret_id),
            Step::Test => self.test_secret(&request.secret_id),
            Step::Finish => self.finish_secret(&request.secret_id, &request.request_token),
        }
    }
}
