//! Error types for BlueQuery.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for BlueQuery operations.
#[derive(Error, Debug)]
pub enum BlueQueryError {
    /// Configuration errors (bad env values, unusable settings, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors (file missing, SQL failures, timeouts, etc.)
    #[error("Database error: {0}")]
    Db(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlueQueryError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a database error with the given message.
    pub fn db(msg: impl Into<String>) -> Self {
        Self::Db(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Db(_) => "Database Error",
            Self::Llm(_) => "LLM Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Renders the error as the text clients receive inside a query payload.
    ///
    /// Database failures keep the `SQL error:` prefix the frontend matches
    /// on; everything else is reported as a backend fault.
    pub fn payload_message(&self) -> String {
        match self {
            Self::Db(msg) => format!("SQL error: {}", msg),
            Self::Config(msg) | Self::Llm(msg) | Self::Internal(msg) => {
                format!("Backend error: {}", msg)
            }
        }
    }
}

/// Result type alias using BlueQueryError.
pub type Result<T> = std::result::Result<T, BlueQueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = BlueQueryError::config("SQL_MAX_ROWS must be a positive integer");
        assert_eq!(
            err.to_string(),
            "Configuration error: SQL_MAX_ROWS must be a positive integer"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_db() {
        let err = BlueQueryError::db("no such table: traj_rel");
        assert_eq!(err.to_string(), "Database error: no such table: traj_rel");
        assert_eq!(err.category(), "Database Error");
    }

    #[test]
    fn test_error_display_llm() {
        let err = BlueQueryError::llm("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "LLM error: Rate limited. Please wait.");
        assert_eq!(err.category(), "LLM Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = BlueQueryError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_payload_message_db_keeps_sql_prefix() {
        let err = BlueQueryError::db("near \"SELEC\": syntax error");
        assert_eq!(
            err.payload_message(),
            "SQL error: near \"SELEC\": syntax error"
        );
    }

    #[test]
    fn test_payload_message_other_is_backend_error() {
        let err = BlueQueryError::internal("poisoned cache lock");
        assert_eq!(err.payload_message(), "Backend error: poisoned cache lock");

        let err = BlueQueryError::llm("connection reset");
        assert_eq!(err.payload_message(), "Backend error: connection reset");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BlueQueryError>();
    }
}
