use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: String },

    #[error("{field} must be non-negative, got {value}")]
    MustBeNonNegative { field: &'static str, value: String },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
        value: String,
    },

    #[error("invalid target URL {value}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {value}: expected 'Key: Value'")]
    InvalidHeader { value: String },
}
