//! Unified error types for httpcache.
//!
//! Every variant carries a stable code prefix so callers can match on the
//! rendered message as well as on the variant.

use tokio_rusqlite::rusqlite;

use crate::controller::Operation;
use crate::transport::TransportError;

/// Unified error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The controller has no collection configured.
    #[error("CONFIG_ERROR: Set a collection before using method: {operation}")]
    MissingCollection { operation: Operation },

    /// A required operation parameter was missing or empty.
    #[error(
        "INVALID_INPUT: Missing or invalid parameter \"{param}\" in method \"{operation}\" with collection \"{collection}\""
    )]
    InvalidParameter { operation: Operation, param: &'static str, collection: String },

    /// Invalid input that is not tied to a single operation parameter.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The remote endpoint answered with a non-success status.
    #[error("REMOTE_ERROR: {message}")]
    Remote { status: u16, message: String },

    /// The remote endpoint could not be reached.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The remote endpoint answered with a body we could not interpret.
    #[error("MALFORMED_RESPONSE: {0}")]
    MalformedResponse(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A cached document could not be encoded or decoded.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    /// Message supplied by the remote endpoint, if this is a remote failure.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Error::Remote { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Remote { status, message } => Error::Remote { status, message },
            TransportError::Network(msg) => Error::Network(msg),
            TransportError::Timeout => Error::Network("request timed out".into()),
            TransportError::InvalidBody(msg) => Error::MalformedResponse(msg),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collection_display() {
        let err = Error::MissingCollection { operation: Operation::Get };
        assert_eq!(err.to_string(), "CONFIG_ERROR: Set a collection before using method: get");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = Error::InvalidParameter { operation: Operation::Patch, param: "prop", collection: "users".into() };
        let msg = err.to_string();
        assert!(msg.starts_with("INVALID_INPUT"));
        assert!(msg.contains("\"prop\""));
        assert!(msg.contains("\"patch\""));
        assert!(msg.contains("\"users\""));
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: Error = TransportError::Remote { status: 404, message: "not found".into() }.into();
        assert!(matches!(err, Error::Remote { status: 404, .. }));
        assert_eq!(err.remote_message(), Some("not found"));

        let err: Error = TransportError::Timeout.into();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(err.remote_message(), None);
    }
}
