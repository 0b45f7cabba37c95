//! The framework-native inbound request shape consumed by the bridge.

use std::collections::HashMap;

/// An inbound request as handed over by the host framework's lifecycle hook.
///
/// This is the narrow shape the bridge needs: the request host, the path,
/// the query string as ordered key/value pairs, and the header map (which
/// may carry a single combined `cookie` header).
///
/// # Example
///
/// ```rust
/// use shopify_bridge::InboundRequest;
///
/// let request = InboundRequest::new("myapp.example.com", "/")
///     .with_query_param("shop", "demo-shop.myshopify.com")
///     .with_header("cookie", "a=1; b=2");
///
/// assert_eq!(request.query_param("shop"), Some("demo-shop.myshopify.com"));
/// assert_eq!(request.header("cookie"), Some("a=1; b=2"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InboundRequest {
    /// The host the request was addressed to.
    pub host: String,

    /// The request path, e.g. `/` or `/auth`.
    pub path: String,

    /// Query string parameters, in order of appearance.
    pub query: Vec<(String, String)>,

    /// Request headers. Keys are matched case-insensitively.
    pub headers: HashMap<String, String>,
}

impl InboundRequest {
    /// Creates a request with the given host and path and no query
    /// parameters or headers.
    #[must_use]
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            query: Vec::new(),
            headers: HashMap::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header. The name is stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Returns the first query parameter with the given name, if present.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the header with the given name, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers.get(&name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_returns_first_match() {
        let request = InboundRequest::new("example.com", "/")
            .with_query_param("shop", "first.myshopify.com")
            .with_query_param("shop", "second.myshopify.com");

        assert_eq!(request.query_param("shop"), Some("first.myshopify.com"));
    }

    #[test]
    fn test_query_param_missing() {
        let request = InboundRequest::new("example.com", "/");
        assert_eq!(request.query_param("shop"), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = InboundRequest::new("example.com", "/").with_header("Cookie", "a=1");
        assert_eq!(request.header("cookie"), Some("a=1"));
        assert_eq!(request.header("COOKIE"), Some("a=1"));
    }
}
