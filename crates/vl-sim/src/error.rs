//! Error types for configuration and scenario handling.
//!
//! The running simulation never fails; these cover input at its edges.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Invalid scenario: {what}")]
    InvalidScenario { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<vl_core::CoreError> for SimError {
    fn from(e: vl_core::CoreError) -> Self {
        SimError::InvalidConfig {
            what: e.to_string(),
        }
    }
}
