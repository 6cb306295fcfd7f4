//! Transport contract for reaching the remote resource endpoint.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// HTTP methods used by the resource cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against the resource endpoint.
///
/// `path` is the absolute collection path (`/domain/collection`); transports
/// resolve it against their own base URL. `resource` is the raw document id.
/// It is one path segment whatever characters it holds, so transports must
/// encode it instead of splicing it into `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    pub method: Method,
    pub path: String,
    pub resource: Option<String>,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ResourceRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), resource: None, params: Vec::new(), body: None }
    }

    pub fn with_resource(mut self, id: impl Into<String>) -> Self {
        self.resource = Some(id.into());
        self
    }

    /// Unencoded `path/resource`, for logs and assertions.
    pub fn target(&self) -> String {
        match &self.resource {
            Some(id) => format!("{}/{}", self.path.trim_end_matches('/'), id),
            None => self.path.clone(),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Failure reported by a transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Non-success response; `message` is whatever the server supplied.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    /// Response body was not valid JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Request/response exchange with the remote endpoint.
///
/// Implementations return the decoded JSON body of a successful response,
/// or `Value::Null` when the body is empty.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: ResourceRequest) -> Result<Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.as_str(), "PATCH");
    }

    #[test]
    fn test_request_builder() {
        let req = ResourceRequest::new(Method::Put, "/users/1")
            .with_params(vec![("a".into(), "1".into())])
            .with_body(json!({"doc": {"id": 1}}));
        assert_eq!(req.path, "/users/1");
        assert_eq!(req.resource, None);
        assert_eq!(req.params.len(), 1);
        assert_eq!(req.body, Some(json!({"doc": {"id": 1}})));
    }

    #[test]
    fn test_resource_stays_a_separate_segment() {
        let req = ResourceRequest::new(Method::Delete, "/users").with_resource("../admin");
        assert_eq!(req.path, "/users");
        assert_eq!(req.resource.as_deref(), Some("../admin"));
        assert_eq!(req.target(), "/users/../admin");
    }

    #[test]
    fn test_remote_error_displays_server_message() {
        let err = TransportError::Remote { status: 400, message: "bad id".into() };
        assert_eq!(err.to_string(), "bad id");
    }
}
