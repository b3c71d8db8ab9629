//! Rotation configuration.
//!
//! Candidate-generation policy and the access level used when validating a
//! pending credential. Policy is configuration supplied by the deployment,
//! never hardcoded per call.

use serde::Deserialize;

use crate::core::target::AccessLevel;
use crate::error::Result;

/// Character classes a generation policy may exclude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterClass {
    Lowercase,
    Uppercase,
    Digits,
    Punctuation,
}

impl CharacterClass {
    /// All classes, in alphabet-assembly order.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Lowercase,
        CharacterClass::Uppercase,
        CharacterClass::Digits,
        CharacterClass::Punctuation,
    ];

    /// The characters belonging to this class.
    pub fn alphabet(&self) -> &'static str {
        match self {
            CharacterClass::Lowercase => "abcdefghijklmnopqrstuvwxyz",
            CharacterClass::Uppercase => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            CharacterClass::Digits => "0123456789",
            CharacterClass::Punctuation => "!#$%&()*+,-.:;<=>?[]^_{|}~",
        }
    }
}

/// Constraints on generated candidate credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationPolicy {
    /// Length of the generated value.
    pub length: usize,
    /// Character classes the value must not contain.
    pub exclude: Vec<CharacterClass>,
    /// Guarantee at least one character from every included class.
    pub require_each_class: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            length: 32,
            exclude: vec![CharacterClass::Punctuation],
            require_each_class: true,
        }
    }
}

impl GenerationPolicy {
    /// Classes the policy permits.
    pub fn included_classes(&self) -> Vec<CharacterClass> {
        CharacterClass::ALL
            .into_iter()
            .filter(|c| !self.exclude.contains(c))
            .collect()
    }
}

/// Top-level rotation handler configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationConfig {
    /// Candidate-generation constraints.
    pub generation: GenerationPolicy,
    /// Access pattern exercised when validating the pending credential.
    pub access_level: AccessLevel,
}

impl RotationConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
