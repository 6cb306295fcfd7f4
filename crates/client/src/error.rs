//! HTTP client error types.

use std::sync::Arc;

use httpcache_core::TransportError;

use crate::url::UrlError;

/// Errors from the HTTP transport before a response is interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL or request path could not be turned into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(Arc<reqwest::Error>),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_builder() {
            ClientError::Build(Arc::new(err))
        } else {
            ClientError::Network(Arc::new(err))
        }
    }
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout => TransportError::Timeout,
            other => TransportError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = ClientError::InvalidUrl(UrlError::Empty);
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_into_transport_error() {
        assert_eq!(TransportError::from(ClientError::Timeout), TransportError::Timeout);
        assert!(matches!(
            TransportError::from(ClientError::InvalidUrl(UrlError::Empty)),
            TransportError::Network(_)
        ));
    }
}
