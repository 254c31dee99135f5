//! Error types for the extraction library.
//!
//! Structural ambiguity in the input never surfaces as an error; it is
//! resolved by fallback (implicit containers, generic format, sequential
//! numbering). Only I/O and serialization failures reach the caller.

use thiserror::Error;

/// Main error type for the extraction library.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the input stream failed. The only error that aborts a parse.
    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = ExtractError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated",
        ));
        assert!(err.to_string().contains("reading input"));
        assert!(err.to_string().contains("truncated"));
    }
}
