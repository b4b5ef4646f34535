//! Error types for tabletalk.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for tabletalk operations.
#[derive(Error, Debug)]
pub enum TabletalkError {
    /// Dataset loading errors (unreadable file, unsupported format, etc.)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Query execution errors (invalid SQL, missing columns, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// LLM API errors (malformed structured output, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TabletalkError {
    /// Creates a dataset error with the given message.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "Dataset Error",
            Self::Query(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using TabletalkError.
pub type Result<T> = std::result::Result<T, TabletalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_dataset() {
        let err = TabletalkError::dataset("Unsupported file format: data.parquet");
        assert_eq!(
            err.to_string(),
            "Dataset error: Unsupported file format: data.parquet"
        );
        assert_eq!(err.category(), "Dataset Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = TabletalkError::query("no such column: revenue");
        assert_eq!(err.to_string(), "Query error: no such column: revenue");
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_llm() {
        let err = TabletalkError::llm("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "LLM error: Rate limited. Please wait.");
        assert_eq!(err.category(), "LLM Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = TabletalkError::config("missing field 'dataset' in config");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'dataset' in config"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TabletalkError>();
    }
}
