use thiserror::Error;

use super::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("run id {run_id} already exists in storage")]
    DuplicateRunId { run_id: String },
}
