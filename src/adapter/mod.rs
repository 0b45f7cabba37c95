//! Request adaptation for the OAuth middleware.
//!
//! The middleware was written against a different framework's context shape.
//! Rather than mimicking that type structurally, this module exposes an
//! explicit [`AdaptedContext`] built from a framework-native
//! [`InboundRequest`](crate::InboundRequest), plus the narrow capability
//! traits ([`HeaderReader`], [`HeaderWriter`], [`StatusSetter`],
//! [`Redirector`]) the middleware actually consumes.
//!
//! # Example
//!
//! ```rust
//! use shopify_bridge::adapter::convert;
//! use shopify_bridge::{ApiSecretKey, InboundRequest};
//!
//! let key = ApiSecretKey::new("secret").unwrap();
//! let request = InboundRequest::new("myapp.example.com", "/")
//!     .with_header("cookie", "a=1; b=2");
//!
//! let ctx = convert(&request, &key);
//! assert_eq!(ctx.status(), 200);
//! ```

mod cookies;
mod headers;

pub use cookies::SignedCookies;
pub use headers::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};

use crate::config::ApiSecretKey;
use crate::middleware::AuthState;
use crate::request::InboundRequest;

/// Read access to the adapted headers.
pub trait HeaderReader {
    /// Returns the header with the given name, matched case-insensitively.
    fn header(&self, name: &str) -> Option<&HeaderValue>;
}

/// Write access to the adapted headers, with set-cookie reconciliation.
pub trait HeaderWriter {
    /// Sets a header. See [`HeaderMap::set`] for the set-cookie contract.
    fn set_header(&mut self, name: &str, value: HeaderValue);
}

/// Mutation of the response status code.
pub trait StatusSetter {
    /// Sets the response status.
    fn set_status(&mut self, status: u16);
}

/// Redirect issuance.
pub trait Redirector {
    /// Sets status 302 and the `location` header.
    fn redirect(&mut self, url: &str);
}

/// The synthetic request/response context handed to the OAuth middleware.
///
/// Constructed per request by [`convert`], mutated by the middleware through
/// the capability traits, and discarded when handling ends. Never persisted.
#[derive(Clone, Debug)]
pub struct AdaptedContext {
    host: String,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    status: u16,
    state: Option<AuthState>,
    cookies: SignedCookies,
}

impl AdaptedContext {
    /// The host the original request was addressed to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The original request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The original query parameters, in order of appearance.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the first query parameter with the given name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The current response status. Defaults to 200.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The adapted header map.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets the status as an abort side channel.
    ///
    /// The middleware signals abort conditions by status rather than by
    /// raising; nothing is thrown here either.
    pub fn abort(&mut self, status: u16) {
        self.set_status(status);
    }

    /// Returns the verified value of a signed cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(&self.headers, name)
    }

    /// Sets a signed cookie (value plus `<name>.sig` sibling).
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.set(&mut self.headers, name, value);
    }

    /// The auth state the middleware deposited, if OAuth has completed.
    #[must_use]
    pub const fn auth_state(&self) -> Option<&AuthState> {
        self.state.as_ref()
    }

    /// Deposits the middleware's auth result on the context.
    pub fn set_auth_state(&mut self, state: AuthState) {
        self.state = Some(state);
    }
}

impl HeaderReader for AdaptedContext {
    fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}

impl HeaderWriter for AdaptedContext {
    fn set_header(&mut self, name: &str, value: HeaderValue) {
        self.headers.set(name, value);
    }
}

impl StatusSetter for AdaptedContext {
    fn set_status(&mut self, status: u16) {
        self.status = status;
    }
}

impl Redirector for AdaptedContext {
    fn redirect(&mut self, url: &str) {
        self.status = 302;
        self.headers.set("location", url.into());
    }
}

/// Converts a framework-native request into an [`AdaptedContext`].
///
/// The header map is primed from the request's headers. If an incoming
/// `cookie` header is present it is split on `;`, each segment trimmed, and
/// the resulting list stored under `set-cookie`: cookies already present in
/// the request become the baseline the reconciliation logic de-duplicates
/// against when the middleware sets new ones.
///
/// The signed cookie jar is bound to `signing_key` with the `Secure`
/// attribute always enabled; the adapter treats the transport as encrypted
/// regardless of how the request actually arrived.
#[must_use]
pub fn convert(request: &InboundRequest, signing_key: &ApiSecretKey) -> AdaptedContext {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        headers.insert(name, value.as_str().into());
    }

    if let Some(cookie_header) = request.header(COOKIE) {
        let baseline: Vec<String> = cookie_header
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect();
        headers.insert(SET_COOKIE, baseline.into());
    }

    AdaptedContext {
        host: request.host.clone(),
        path: request.path.clone(),
        query: request.query.clone(),
        headers,
        status: 200,
        state: None,
        cookies: SignedCookies::new(signing_key),
    }
}
