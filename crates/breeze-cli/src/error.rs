//! CLI error types.

use breeze_api::{ApiError, StatusEnvelope};
use thiserror::Error;

use crate::secret::SecretError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A call came back with a non-ok status.
    #[error("{action} failed: {status}")]
    Call { action: String, status: String },

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Tracing(#[from] breeze_core::tracing::TracingError),
}

impl CliError {
    pub fn call(action: &str, envelope: &StatusEnvelope) -> Self {
        Self::Call {
            action: action.to_string(),
            status: envelope.to_string(),
        }
    }
}
