use crate::error::ValidationError;

/// Parses a `Key: Value` header flag, as repeatable `--header` arguments.
pub fn parse_header(raw: &str) -> Result<(String, String), ValidationError> {
    let (key, value) = raw.split_once(':').ok_or_else(|| ValidationError::InvalidHeader {
        value: raw.to_string(),
    })?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}
