//! Request description handed to [`Client::send`](crate::Client::send).

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;

/// Everything needed to issue one API request.
///
/// `path` is relative to the API base URL, or an absolute `http(s)://` URL.
/// Path segments added with [`with_path_segment`](Self::with_path_segment)
/// are percent-encoded, so they may carry arbitrary identifiers.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path (relative to the base URL, or absolute).
    pub path: String,

    /// Extra path segments appended after `path`.
    pub segments: Vec<String>,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Query parameters for this request, in order.
    pub query_params: Vec<(String, String)>,

    /// Optional JSON body.
    pub body: Option<Value>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Appends a path segment.
    pub fn with_path_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON request body.
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}
