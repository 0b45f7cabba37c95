//! Bridge configuration.
//!
//! The main types in this module are:
//!
//! - [`BridgeConfig`]: all settings the bridge needs to route and adapt
//!   requests
//! - [`BridgeConfigBuilder`]: a builder for constructing [`BridgeConfig`]
//!   instances
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated
//!   newtypes
//! - [`AuthScopes`]: the comma-separated OAuth scope list
//!
//! Configuration can be built programmatically or loaded from the
//! environment via [`BridgeConfig::from_env`].
//!
//! # Example
//!
//! ```rust
//! use shopify_bridge::{ApiKey, ApiSecretKey, BridgeConfig, HostUrl, ShopDomain};
//!
//! let config = BridgeConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .default_shop(ShopDomain::new("demo-shop").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.host().host_name(), "myapp.example.com");
//! ```

mod newtypes;
mod scopes;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use scopes::AuthScopes;

use crate::error::ConfigError;
use std::env;

/// Configuration for the auth bridge.
///
/// Holds the API credentials, the OAuth scope list, the application host,
/// and the default shop used when a bare root request arrives with neither
/// `shop` nor `host` query parameters.
///
/// # Thread Safety
///
/// `BridgeConfig` is `Clone`, `Send`, and `Sync`, so it can be shared across
/// async tasks.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    scopes: AuthScopes,
    host: HostUrl,
    default_shop: ShopDomain,
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Loads the configuration from the environment.
    ///
    /// Reads `SHOPIFY_API_KEY`, `SHOPIFY_API_SECRET`, `SCOPES` (comma
    /// separated), `HOST` (full URL; the scheme-stripped form is available
    /// via [`HostUrl::host_name`]), and `SHOP` (the default shop for bare
    /// root visits).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] for any unset variable, or the
    /// relevant validation error for values that fail to parse. Callers are
    /// expected to treat this as fatal at process startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = ApiKey::new(require_env("SHOPIFY_API_KEY")?)?;
        let api_secret_key = ApiSecretKey::new(require_env("SHOPIFY_API_SECRET")?)?;
        let scopes: AuthScopes = require_env("SCOPES")?.parse()?;
        let host = HostUrl::new(require_env("HOST")?)?;
        let default_shop = ShopDomain::new(require_env("SHOP")?)?;

        Ok(Self {
            api_key,
            api_secret_key,
            scopes,
            host,
            default_shop,
        })
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    ///
    /// Also used as the cookie-signing key for adapted contexts.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the configured OAuth scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the application host URL.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the default shop used for bare root requests.
    #[must_use]
    pub const fn default_shop(&self) -> &ShopDomain {
        &self.default_shop
    }
}

// Verify BridgeConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BridgeConfig>();
};

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar { name })
}

/// Builder for constructing [`BridgeConfig`] instances.
///
/// All five fields are required; [`build`](Self::build) reports the first
/// missing one.
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    default_shop: Option<ShopDomain>,
}

impl BridgeConfigBuilder {
    /// Creates a new builder with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key.
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the application host URL.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the default shop for bare root requests.
    #[must_use]
    pub fn default_shop(mut self, shop: ShopDomain) -> Self {
        self.default_shop = Some(shop);
        self
    }

    /// Builds the [`BridgeConfig`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] naming the first field
    /// that was not set.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        Ok(BridgeConfig {
            api_key: self
                .api_key
                .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?,
            api_secret_key: self
                .api_secret_key
                .ok_or(ConfigError::MissingRequiredField {
                    field: "api_secret_key",
                })?,
            scopes: self
                .scopes
                .ok_or(ConfigError::MissingRequiredField { field: "scopes" })?,
            host: self
                .host
                .ok_or(ConfigError::MissingRequiredField { field: "host" })?,
            default_shop: self
                .default_shop
                .ok_or(ConfigError::MissingRequiredField {
                    field: "default_shop",
                })?,
        })
    }
}
