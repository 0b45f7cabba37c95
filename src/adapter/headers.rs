//! Header storage for the adapted context.
//!
//! Header names are normalized to lowercase before storage or lookup,
//! matching HTTP semantics. The interesting part is set-cookie
//! reconciliation: the middleware sets cookies repeatedly during the OAuth
//! dance, and each new assignment must replace any earlier assignment for
//! the same cookie name rather than appending a duplicate. The final
//! sequence is also mirrored into a combined `cookie` header so the
//! middleware can read back what it just wrote.

use std::collections::HashMap;

/// The canonical lowercase name of the set-cookie header.
pub const SET_COOKIE: &str = "set-cookie";

/// The canonical lowercase name of the cookie header.
pub const COOKIE: &str = "cookie";

/// A header value: either a single string or an ordered sequence of strings.
///
/// Only `set-cookie` legitimately carries multiple values; everything else
/// is stored as [`HeaderValue::Single`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single header value.
    Single(String),

    /// An ordered sequence of values (set-cookie).
    Multi(Vec<String>),
}

impl HeaderValue {
    /// Returns the value as a single string, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(_) => None,
        }
    }

    /// Returns the value as a list. A single value is a one-element list.
    #[must_use]
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multi(values) => values,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

/// A case-insensitive header map with set-cookie reconciliation.
///
/// # Example
///
/// ```rust
/// use shopify_bridge::adapter::{HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.set("Set-Cookie", vec!["session=abc".to_string()].into());
/// headers.set("set-cookie", vec!["session=def".to_string()].into());
///
/// // Only the newest assignment for `session` survives.
/// let combined = headers.get("cookie").and_then(HeaderValue::as_str);
/// assert_eq!(combined, Some("session=def"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, HeaderValue>,
}

impl HeaderMap {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the header with the given name, matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    /// Returns `true` if a header with the given name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Inserts a header without reconciliation, lowercasing the name.
    ///
    /// Used when priming the map from an inbound request; [`set`](Self::set)
    /// is the write path the middleware sees.
    pub fn insert(&mut self, name: &str, value: HeaderValue) {
        self.entries.insert(name.to_ascii_lowercase(), value);
    }

    /// Sets a header, lowercasing the name.
    ///
    /// For `set-cookie` the value is treated as an ordered sequence of
    /// cookie strings and reconciled against the accumulated sequence:
    ///
    /// 1. For each new cookie, the cookie name (substring before the first
    ///    `=`) is extracted and any existing entry whose prefix matches
    ///    `name=` is removed, so only the newest assignment survives.
    /// 2. The new cookies are appended after the filtered existing ones.
    /// 3. A combined `cookie` header is synthesized by joining the final
    ///    sequence with `;`.
    ///
    /// A cookie string with no `=` has no extractable name; it is appended
    /// unchanged and evicts nothing.
    pub fn set(&mut self, name: &str, value: HeaderValue) {
        let name = name.to_ascii_lowercase();
        if name == SET_COOKIE {
            self.reconcile_set_cookie(value.into_list());
        } else {
            self.entries.insert(name, value);
        }
    }

    fn reconcile_set_cookie(&mut self, incoming: Vec<String>) {
        let mut accumulated = self
            .entries
            .remove(SET_COOKIE)
            .map(HeaderValue::into_list)
            .unwrap_or_default();

        for cookie in &incoming {
            if let Some(cookie_name) = cookie_name(cookie) {
                let prefix = format!("{cookie_name}=");
                accumulated.retain(|existing| !existing.starts_with(&prefix));
            }
        }
        accumulated.extend(incoming);

        self.entries.insert(
            COOKIE.to_string(),
            HeaderValue::Single(accumulated.join(";")),
        );
        self.entries
            .insert(SET_COOKIE.to_string(), HeaderValue::Multi(accumulated));
    }

    /// Returns an iterator over all `(name, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Extracts the cookie name: the substring before the first `=`.
///
/// Returns `None` for a malformed cookie string with no `=`.
fn cookie_name(cookie: &str) -> Option<&str> {
    cookie.split_once('=').map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_cookies(headers: &mut HeaderMap, cookies: &[&str]) {
        let values: Vec<String> = cookies.iter().map(ToString::to_string).collect();
        headers.set(SET_COOKIE, values.into());
    }

    #[test]
    fn test_names_are_lowercased_on_set_and_get() {
        let mut headers = HeaderMap::new();
        headers.set("Location", "/auth".into());
        assert_eq!(
            headers.get("location").and_then(HeaderValue::as_str),
            Some("/auth")
        );
        assert_eq!(
            headers.get("LOCATION").and_then(HeaderValue::as_str),
            Some("/auth")
        );
    }

    #[test]
    fn test_set_cookie_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.set("Set-Cookie", vec!["a=1".to_string()].into());
        headers.set("set-cookie", vec!["a=2".to_string()].into());

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["a=2"]);
    }

    #[test]
    fn test_newest_assignment_wins_for_same_cookie_name() {
        let mut headers = HeaderMap::new();
        set_cookies(&mut headers, &["session=first; Path=/"]);
        set_cookies(&mut headers, &["session=second; Path=/"]);

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["session=second; Path=/"]);

        let combined = headers.get(COOKIE).and_then(HeaderValue::as_str).unwrap();
        assert_eq!(combined, "session=second; Path=/");
    }

    #[test]
    fn test_unrelated_cookies_are_preserved_in_order() {
        let mut headers = HeaderMap::new();
        set_cookies(&mut headers, &["a=1", "b=2"]);
        set_cookies(&mut headers, &["a=3"]);

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["b=2", "a=3"]);
        assert_eq!(
            headers.get(COOKIE).and_then(HeaderValue::as_str),
            Some("b=2;a=3")
        );
    }

    #[test]
    fn test_prefix_match_does_not_evict_longer_names() {
        let mut headers = HeaderMap::new();
        set_cookies(&mut headers, &["session_token=abc"]);
        set_cookies(&mut headers, &["session=def"]);

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["session_token=abc", "session=def"]);
    }

    #[test]
    fn test_multiple_new_cookies_in_one_call() {
        let mut headers = HeaderMap::new();
        set_cookies(&mut headers, &["a=1", "b=2", "c=3"]);
        set_cookies(&mut headers, &["b=20", "d=4"]);

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["a=1", "c=3", "b=20", "d=4"]);
    }

    #[test]
    fn test_malformed_cookie_without_equals_passes_through() {
        let mut headers = HeaderMap::new();
        set_cookies(&mut headers, &["a=1", "b=2"]);
        set_cookies(&mut headers, &["not-a-cookie"]);

        // Nothing evicted, the malformed entry is appended as-is.
        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["a=1", "b=2", "not-a-cookie"]);
    }

    #[test]
    fn test_single_value_is_treated_as_one_cookie() {
        let mut headers = HeaderMap::new();
        headers.set(SET_COOKIE, "a=1".into());
        headers.set(SET_COOKIE, "a=2".into());

        let cookies = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(cookies, vec!["a=2"]);
    }

    #[test]
    fn test_plain_header_overwrites() {
        let mut headers = HeaderMap::new();
        headers.set("location", "/a".into());
        headers.set("location", "/b".into());
        assert_eq!(
            headers.get("location").and_then(HeaderValue::as_str),
            Some("/b")
        );
    }

    #[test]
    fn test_insert_does_not_reconcile() {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, vec!["a=1".to_string()].into());
        // No combined cookie header synthesized by the priming path.
        assert!(!headers.contains(COOKIE));
    }
}
