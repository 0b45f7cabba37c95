//! OAuth scope list handling.
//!
//! The bridge does not interpret scopes; it only parses the configured
//! comma-separated list and forwards it to the middleware and session store.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An ordered list of OAuth scopes, parsed from a comma-separated string.
///
/// Order is preserved and duplicates are dropped (first occurrence wins) so
/// the serialized form stays stable across round trips.
///
/// # Example
///
/// ```rust
/// use shopify_bridge::AuthScopes;
///
/// let scopes: AuthScopes = "read_products, write_orders".parse().unwrap();
/// assert_eq!(scopes.to_string(), "read_products,write_orders");
/// assert!(!scopes.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no scopes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns an iterator over the scopes in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Vec::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }

            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            if !scopes.iter().any(|s: &String| s == scope) {
                scopes.push(scope.to_string());
            }
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_trims() {
        let scopes: AuthScopes = " read_products , write_orders ".parse().unwrap();
        let collected: Vec<&str> = scopes.iter().collect();
        assert_eq!(collected, vec!["read_products", "write_orders"]);
    }

    #[test]
    fn test_preserves_order_and_drops_duplicates() {
        let scopes: AuthScopes = "write_orders,read_products,write_orders".parse().unwrap();
        assert_eq!(scopes.to_string(), "write_orders,read_products");
    }

    #[test]
    fn test_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_empty_string_parses_to_empty() {
        let scopes: AuthScopes = "".parse().unwrap();
        assert!(scopes.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let scopes: AuthScopes = "read_products,write_orders".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_products,write_orders""#);
        let back: AuthScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);
    }
}
