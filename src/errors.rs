use std::path::PathBuf;
use thiserror::Error;

/// Client-side error code used when the server cannot be reached at all.
pub const CR_CONN_HOST_ERROR: u16 = 2003;
/// Client-side error code used when the host name does not resolve.
pub const CR_UNKNOWN_HOST: u16 = 2005;
/// Client-side error code for anything the driver cannot classify.
pub const CR_UNKNOWN_ERROR: u16 = 2000;

/// Broad classification of a failed connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// Host unreachable, refused, or not resolvable
    Unreachable,
    /// Server answered and rejected the credentials
    Authentication,
    /// Handshake or packet level failure
    Protocol,
}

/// A connection attempt that did not produce a session.
///
/// Codes follow the MySQL convention: values below 2000 come from the server,
/// values from 2000 up are client-side failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectError {
    pub kind: ConnectErrorKind,
    pub code: u16,
    pub message: String,
}

impl ConnectError {
    pub fn new(kind: ConnectErrorKind, code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// The server is probably still starting up, so waiting may help.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        self.code >= CR_UNKNOWN_ERROR
    }
}

/// A statement the server refused, carrying the engine's own error text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    pub code: Option<u16>,
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

impl From<mysql::Error> for QueryError {
    fn from(err: mysql::Error) -> Self {
        match err {
            mysql::Error::MySqlError(e) => QueryError::with_code(e.code, e.message),
            other => QueryError::new(other.to_string()),
        }
    }
}

/// Failure while streaming a dump into the server
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("failed to read sql file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StateMachineError {
    #[error("No handler registered for state: {state}")]
    NoHandlerRegistered { state: String },

    #[error("State machine completed without a result")]
    MissingResult,
}

/// Errors from loading tuning configuration or setting up logging
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display_is_engine_text() {
        let err = ConnectError::new(
            ConnectErrorKind::Authentication,
            1045,
            "Access denied for user 'root'@'%' (using password: YES)",
        );
        assert_eq!(
            err.to_string(),
            "Access denied for user 'root'@'%' (using password: YES)"
        );
        assert!(!err.is_not_ready());
    }

    #[test]
    fn test_client_codes_are_not_ready() {
        let err = ConnectError::new(ConnectErrorKind::Unreachable, CR_CONN_HOST_ERROR, "refused");
        assert!(err.is_not_ready());
    }

    #[test]
    fn test_server_error_keeps_code_and_message() {
        let server = mysql::MySqlError {
            state: "23000".to_string(),
            message: "Duplicate entry '1' for key 'PRIMARY'".to_string(),
            code: 1062,
        };
        let err: QueryError = mysql::Error::MySqlError(server).into();
        assert_eq!(err.code, Some(1062));
        assert_eq!(err.to_string(), "Duplicate entry '1' for key 'PRIMARY'");
    }

    #[test]
    fn test_import_error_from_query() {
        let err: ImportError = QueryError::new("syntax error").into();
        assert_eq!(err.to_string(), "syntax error");
    }
}
