//! Error types for awcheck.

use thiserror::Error;

/// Check run error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or malformed settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query failed on the server or its rows could not be decoded.
    #[error("Query error: {0}")]
    Query(String),

    /// A schema, table or column name is not a plain SQL identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A permitted-value list could not be parsed.
    #[error("Invalid value set: {0}")]
    InvalidValueSet(String),

    /// The connection was already closed.
    #[error("Connection already closed")]
    Closed,

    /// TDS driver error.
    #[error("TDS error: {0}")]
    Tds(#[from] tiberius::error::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing db_host".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing db_host");
    }

    #[test]
    fn test_error_from_figment() {
        let err: Error = figment::Error::from("missing field `db_host`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("db_host"));
    }
}
