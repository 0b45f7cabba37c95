//! Signed cookie access over the adapted header map.
//!
//! The OAuth middleware expects a signing-key-aware cookie jar: every cookie
//! it sets is accompanied by a `<name>.sig` sibling carrying an HMAC of
//! `name=value`, and reads are only honored when the signature verifies.
//! Signatures are HMAC-SHA256, base64url-encoded without padding, and
//! compared in constant time.
//!
//! The `Secure` attribute is always set: the adapter treats the transport as
//! encrypted unconditionally, which is what satisfies the middleware's
//! transport-security check.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::headers::{HeaderMap, COOKIE, SET_COOKIE};
use crate::config::ApiSecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Attributes appended to every cookie the jar writes.
const COOKIE_ATTRIBUTES: &str = "; Path=/; Secure; HttpOnly";

/// A signing-key-aware cookie accessor bound to an adapted header map.
///
/// # Example
///
/// ```rust
/// use shopify_bridge::adapter::{HeaderMap, SignedCookies};
/// use shopify_bridge::ApiSecretKey;
///
/// let key = ApiSecretKey::new("signing-key").unwrap();
/// let cookies = SignedCookies::new(&key);
/// let mut headers = HeaderMap::new();
///
/// cookies.set(&mut headers, "state", "nonce-value");
/// assert_eq!(cookies.get(&headers, "state").as_deref(), Some("nonce-value"));
/// ```
#[derive(Clone)]
pub struct SignedCookies {
    key: Vec<u8>,
}

impl std::fmt::Debug for SignedCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignedCookies(*****)")
    }
}

impl SignedCookies {
    /// Creates a cookie jar signing with the given API secret key.
    #[must_use]
    pub fn new(key: &ApiSecretKey) -> Self {
        Self {
            key: key.as_ref().as_bytes().to_vec(),
        }
    }

    /// Returns the verified value of the named cookie.
    ///
    /// Reads the combined `cookie` header, locates both the cookie and its
    /// `<name>.sig` sibling, and returns the value only when the signature
    /// verifies. Returns `None` for a missing cookie, a missing signature,
    /// or a signature mismatch.
    #[must_use]
    pub fn get(&self, headers: &HeaderMap, name: &str) -> Option<String> {
        let value = find_cookie(headers, name)?;
        let signature = find_cookie(headers, &format!("{name}.sig"))?;

        let expected = self.sign(name, &value);
        let matches: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        matches.then_some(value)
    }

    /// Sets the named cookie and its signature sibling.
    ///
    /// Both entries go through the header map's set-cookie reconciliation,
    /// so repeated sets replace earlier assignments instead of appending
    /// duplicates.
    pub fn set(&self, headers: &mut HeaderMap, name: &str, value: &str) {
        let signature = self.sign(name, value);
        headers.set(
            SET_COOKIE,
            vec![
                format!("{name}={value}{COOKIE_ATTRIBUTES}"),
                format!("{name}.sig={signature}{COOKIE_ATTRIBUTES}"),
            ]
            .into(),
        );
    }

    // HMAC-SHA256 accepts keys of any length, so new_from_slice never fails.
    #[allow(clippy::missing_panics_doc)]
    fn sign(&self, name: &str, value: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(format!("{name}={value}").as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

/// Finds a cookie value in the combined `cookie` header.
///
/// Segments are split on `;` and trimmed; the first segment with a matching
/// `name=` prefix wins. Attribute segments (`Path=/`, `Secure`) simply never
/// match a real cookie name.
fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let combined = headers.get(COOKIE)?.as_str()?;
    let prefix = format!("{name}=");

    combined
        .split(';')
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix(prefix.as_str()))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::headers::HeaderValue;

    fn jar() -> SignedCookies {
        SignedCookies::new(&ApiSecretKey::new("test-signing-key").unwrap())
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let cookies = jar();
        let mut headers = HeaderMap::new();

        cookies.set(&mut headers, "state", "nonce");
        assert_eq!(cookies.get(&headers, "state").as_deref(), Some("nonce"));
    }

    #[test]
    fn test_set_writes_cookie_and_signature_pair() {
        let cookies = jar();
        let mut headers = HeaderMap::new();

        cookies.set(&mut headers, "state", "nonce");

        let set_cookie = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(set_cookie.len(), 2);
        assert!(set_cookie[0].starts_with("state=nonce"));
        assert!(set_cookie[0].contains("Secure"));
        assert!(set_cookie[1].starts_with("state.sig="));
    }

    #[test]
    fn test_get_rejects_tampered_value() {
        let cookies = jar();
        let mut headers = HeaderMap::new();

        cookies.set(&mut headers, "state", "nonce");

        // Overwrite the cookie value while keeping the old signature.
        let signature = find_cookie(&headers, "state.sig").unwrap();
        headers.insert(
            COOKIE,
            HeaderValue::Single(format!("state=tampered;state.sig={signature}")),
        );

        assert_eq!(cookies.get(&headers, "state"), None);
    }

    #[test]
    fn test_get_rejects_missing_signature() {
        let cookies = jar();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::Single("state=nonce".to_string()));

        assert_eq!(cookies.get(&headers, "state"), None);
    }

    #[test]
    fn test_get_missing_cookie_returns_none() {
        let cookies = jar();
        let headers = HeaderMap::new();
        assert_eq!(cookies.get(&headers, "state"), None);
    }

    #[test]
    fn test_repeated_set_replaces_previous_assignment() {
        let cookies = jar();
        let mut headers = HeaderMap::new();

        cookies.set(&mut headers, "state", "first");
        cookies.set(&mut headers, "state", "second");

        let set_cookie = headers.get(SET_COOKIE).unwrap().as_list();
        assert_eq!(set_cookie.len(), 2);
        assert_eq!(cookies.get(&headers, "state").as_deref(), Some("second"));
    }

    #[test]
    fn test_different_keys_do_not_verify() {
        let writer = jar();
        let reader = SignedCookies::new(&ApiSecretKey::new("other-key").unwrap());
        let mut headers = HeaderMap::new();

        writer.set(&mut headers, "state", "nonce");
        assert_eq!(reader.get(&headers, "state"), None);
    }

    #[test]
    fn test_debug_masks_key() {
        let debug = format!("{:?}", jar());
        assert!(!debug.contains("test-signing-key"));
    }
}
