use crate::core::types::StagingLabel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not generate candidate secret: {0}")]
    Generation(String),

    #[error("version conflict: token '{token}' on secret '{secret_id}' already maps to a different value")]
    VersionConflict { secret_id: String, token: String },

    #[error("target resource update failed: {0}")]
    Apply(String),

    #[error("pending credential failed validation: {0}")]
    Validation(String),

    #[error("staging label {label} on secret '{secret_id}' is not held by the expected version")]
    StaleVersion {
        secret_id: String,
        label: StagingLabel,
    },

    #[error("no version of secret '{secret_id}' holds staging label {label}")]
    NotFound {
        secret_id: String,
        label: StagingLabel,
    },

    #[error("request parse error: {0}")]
    RequestParse(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
