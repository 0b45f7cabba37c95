//! Webhook registration and uninstall handling.
//!
//! After a shop completes OAuth, the bridge subscribes to the
//! `app/uninstalled` topic so it can drop the shop's session when the app is
//! removed. The external webhook registry is reached through the
//! [`WebhookRegistrar`] seam; [`GraphqlWebhookRegistrar`] is the production
//! implementation talking to the shop's Admin GraphQL endpoint.

mod registrar;

pub use registrar::GraphqlWebhookRegistrar;

use crate::config::ShopDomain;
use crate::middleware::BoxFuture;
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Webhook topics the bridge knows about.
///
/// Serialized in Shopify's path form (`app/uninstalled`); the GraphQL enum
/// form is available via [`graphql_format`](Self::graphql_format).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    /// The app was uninstalled from a shop.
    #[serde(rename = "app/uninstalled")]
    AppUninstalled,
}

impl WebhookTopic {
    /// Returns the GraphQL enum form of the topic, e.g. `APP_UNINSTALLED`.
    #[must_use]
    pub fn graphql_format(self) -> String {
        serde_json::to_string(&self)
            .unwrap_or_default()
            .trim_matches('"')
            .replace('/', "_")
            .to_uppercase()
    }
}

/// A webhook subscription request handed to the registrar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookSubscription {
    /// The shop to register the webhook for.
    pub shop: ShopDomain,

    /// The access token authorizing the registration.
    pub access_token: String,

    /// The topic to subscribe to.
    pub topic: WebhookTopic,

    /// The callback path, combined with the configured host to form the
    /// delivery URL. Example: `/webhooks`.
    pub path: String,
}

/// Errors from webhook registration or payload handling.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The registration request could not be delivered.
    #[error("webhook registration request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Shopify rejected the registration.
    #[error("Shopify rejected the webhook registration: {message}")]
    ShopifyError {
        /// The userErrors messages, joined.
        message: String,
    },

    /// A webhook payload could not be parsed.
    #[error("failed to parse webhook payload: {message}")]
    PayloadParseError {
        /// Description of the parse failure.
        message: String,
    },
}

/// The external webhook registry collaborator.
pub trait WebhookRegistrar: Send + Sync {
    /// Registers the subscription, returning the created subscription id.
    fn register<'a>(
        &'a self,
        subscription: &'a WebhookSubscription,
    ) -> BoxFuture<'a, Result<String, WebhookError>>;
}

/// The fields consumed from an `app/uninstalled` webhook payload.
#[derive(Clone, Debug, Deserialize)]
pub struct UninstallPayload {
    /// The shop the app was uninstalled from.
    pub shop: ShopDomain,
}

/// Deletes a shop's session when its `app/uninstalled` webhook fires.
///
/// Wire this up as the callback for the subscription registered by
/// [`AuthRouter::after_auth`](crate::router::AuthRouter::after_auth).
///
/// # Example
///
/// ```rust
/// use shopify_bridge::session::{MemorySessionStore, SessionStore, ShopSession};
/// use shopify_bridge::webhooks::AppUninstalledHandler;
/// use shopify_bridge::ShopDomain;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemorySessionStore::new());
/// let shop = ShopDomain::new("demo-shop").unwrap();
/// store.put(ShopSession::new(shop.clone(), "read_products", "host"));
///
/// let handler = AppUninstalledHandler::new(store.clone());
/// handler.handle_json(br#"{"shop": "demo-shop.myshopify.com"}"#).unwrap();
///
/// assert!(store.get(&shop).is_none());
/// ```
#[derive(Clone)]
pub struct AppUninstalledHandler {
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AppUninstalledHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppUninstalledHandler")
    }
}

impl AppUninstalledHandler {
    /// Creates a handler deleting from the given store.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Handles a parsed uninstall payload.
    pub fn handle(&self, payload: &UninstallPayload) {
        tracing::debug!(shop = %payload.shop, "removing session for uninstalled shop");
        self.sessions.delete(&payload.shop);
    }

    /// Parses a raw JSON webhook body and handles it.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::PayloadParseError`] if the body is not valid
    /// JSON or the `shop` field is missing or invalid.
    pub fn handle_json(&self, body: &[u8]) -> Result<(), WebhookError> {
        let payload: UninstallPayload =
            serde_json::from_slice(body).map_err(|e| WebhookError::PayloadParseError {
                message: e.to_string(),
            })?;
        self.handle(&payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, ShopSession};

    #[test]
    fn test_topic_serializes_to_path_form() {
        let json = serde_json::to_string(&WebhookTopic::AppUninstalled).unwrap();
        assert_eq!(json, r#""app/uninstalled""#);
    }

    #[test]
    fn test_topic_graphql_format() {
        assert_eq!(
            WebhookTopic::AppUninstalled.graphql_format(),
            "APP_UNINSTALLED"
        );
    }

    #[test]
    fn test_uninstall_handler_deletes_session() {
        let store = Arc::new(MemorySessionStore::new());
        let shop = ShopDomain::new("demo").unwrap();
        store.put(ShopSession::new(shop.clone(), "read_products", "host"));

        let handler = AppUninstalledHandler::new(store.clone());
        handler.handle(&UninstallPayload { shop: shop.clone() });

        assert!(store.get(&shop).is_none());
    }

    #[test]
    fn test_uninstall_handler_unknown_shop_is_noop() {
        let store = Arc::new(MemorySessionStore::new());
        let handler = AppUninstalledHandler::new(store.clone());
        handler.handle(&UninstallPayload {
            shop: ShopDomain::new("never-installed").unwrap(),
        });
        assert!(store.is_empty());
    }

    #[test]
    fn test_handle_json_parses_shop_field() {
        let store = Arc::new(MemorySessionStore::new());
        let shop = ShopDomain::new("demo").unwrap();
        store.put(ShopSession::new(shop.clone(), "read_products", "host"));

        let handler = AppUninstalledHandler::new(store.clone());
        handler
            .handle_json(br#"{"shop": "demo.myshopify.com", "id": 42}"#)
            .unwrap();

        assert!(store.get(&shop).is_none());
    }

    #[test]
    fn test_handle_json_rejects_invalid_body() {
        let store = Arc::new(MemorySessionStore::new());
        let handler = AppUninstalledHandler::new(store);

        let result = handler.handle_json(b"not json");
        assert!(matches!(
            result,
            Err(WebhookError::PayloadParseError { .. })
        ));
    }
}
