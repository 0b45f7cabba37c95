//! Request routing around the OAuth middleware.
//!
//! [`AuthRouter`] inspects each inbound request and either answers with a
//! redirect directly, delegates to the external OAuth middleware through an
//! adapted context, or passes the request through to the host framework.
//! The transition rules are evaluated in order:
//!
//! 1. Root path, neither `shop` nor `host` present: redirect to root with
//!    the configured default shop.
//! 2. Root path, shop known, no `host`: redirect to root with the shop and
//!    its stored host.
//! 3. Root path, shop unknown: redirect to `/auth?shop=<shop>`.
//! 4. Shop unknown (any path): adapt the request and invoke the middleware.
//!    A middleware error is logged and swallowed; the partially mutated
//!    context is returned either way.
//! 5. `/auth` path, shop known: redirect to root with the shop and its
//!    stored host.
//! 6. Otherwise: passthrough.
//!
//! [`AuthRouter::after_auth`] is the post-OAuth callback: it records the
//! shop session, registers the `app/uninstalled` webhook (non-fatally), and
//! redirects back to root.

use crate::adapter::{convert, AdaptedContext, Redirector};
use crate::config::{BridgeConfig, ShopDomain};
use crate::middleware::AuthMiddleware;
use crate::request::InboundRequest;
use crate::session::{SessionStore, ShopSession};
use crate::webhooks::{AppUninstalledHandler, WebhookRegistrar, WebhookSubscription, WebhookTopic};
use std::sync::Arc;
use urlencoding::encode;

/// The path intercepted as the OAuth entry point.
const AUTH_PATH: &str = "/auth";

/// The callback path registered for webhook delivery.
const WEBHOOKS_PATH: &str = "/webhooks";

/// A redirect response produced by the router itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Always 302.
    pub status: u16,

    /// The redirect target.
    pub location: String,
}

impl Redirect {
    /// Creates a 302 redirect to the given location.
    #[must_use]
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: location.into(),
        }
    }
}

/// The outcome of routing a single request.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The router answered with a redirect directly.
    Redirect(Redirect),

    /// The request was delegated to the middleware; the (possibly partially)
    /// mutated context carries whatever status and headers resulted.
    Adapted(AdaptedContext),

    /// The router has nothing to say; the host framework's default handling
    /// applies.
    Passthrough,
}

/// Routes requests around the OAuth middleware and maintains the shop
/// session registry.
pub struct AuthRouter {
    config: BridgeConfig,
    sessions: Arc<dyn SessionStore>,
    middleware: Arc<dyn AuthMiddleware>,
    registrar: Arc<dyn WebhookRegistrar>,
}

impl std::fmt::Debug for AuthRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRouter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuthRouter {
    /// Creates a router over the given configuration and collaborators.
    #[must_use]
    pub fn new(
        config: BridgeConfig,
        sessions: Arc<dyn SessionStore>,
        middleware: Arc<dyn AuthMiddleware>,
        registrar: Arc<dyn WebhookRegistrar>,
    ) -> Self {
        Self {
            config,
            sessions,
            middleware,
            registrar,
        }
    }

    /// Routes a single inbound request.
    pub async fn handle(&self, request: &InboundRequest) -> RouteOutcome {
        let shop_param = request.query_param("shop");
        let session = shop_param
            .and_then(|raw| ShopDomain::new(raw).ok())
            .and_then(|shop| self.sessions.get(&shop));

        if request.path == "/" {
            let host_param = request.query_param("host");

            if shop_param.is_none() && host_param.is_none() {
                let location = format!(
                    "{}/?shop={}",
                    self.config.host(),
                    encode(self.config.default_shop().as_ref())
                );
                tracing::debug!(%location, "bare root request, redirecting to default shop");
                return RouteOutcome::Redirect(Redirect::to(location));
            }

            if let Some(session) = &session {
                if host_param.is_none() {
                    tracing::debug!(shop = %session.shop, "known shop missing host, backfilling");
                    return RouteOutcome::Redirect(Redirect::to(root_location(
                        shop_param.unwrap_or_default(),
                        &session.host,
                    )));
                }
            } else {
                let location = format!("/auth?shop={}", encode(shop_param.unwrap_or_default()));
                tracing::debug!(%location, "unknown shop at root, redirecting to auth entry");
                return RouteOutcome::Redirect(Redirect::to(location));
            }
        }

        if session.is_none() {
            tracing::debug!(path = %request.path, "unknown shop, delegating to auth middleware");
            let mut ctx = convert(request, self.config.api_secret_key());
            if let Err(error) = self.middleware.authenticate(&mut ctx).await {
                // The context is returned regardless; the host framework
                // interprets whatever status and headers resulted.
                tracing::warn!(%error, "auth middleware failed");
            }
            return RouteOutcome::Adapted(ctx);
        }

        if request.path == AUTH_PATH {
            if let Some(session) = &session {
                tracing::debug!(shop = %session.shop, "shop already authenticated, leaving auth path");
                return RouteOutcome::Redirect(Redirect::to(root_location(
                    shop_param.unwrap_or_default(),
                    &session.host,
                )));
            }
        }

        RouteOutcome::Passthrough
    }

    /// The post-OAuth callback.
    ///
    /// Reads the auth state the middleware deposited and the `host` query
    /// parameter, records the shop session, registers the `app/uninstalled`
    /// webhook at `/webhooks` (a failure is logged but does not fail the
    /// flow), and redirects the context to `/?shop=<shop>&host=<host>`.
    pub async fn after_auth(&self, ctx: &mut AdaptedContext) {
        let Some(auth) = ctx.auth_state().cloned() else {
            tracing::warn!("after_auth invoked without auth state on the context");
            return;
        };

        let host = ctx.query_param("host").unwrap_or_default().to_string();

        let shop = match ShopDomain::new(&auth.shop) {
            Ok(shop) => shop,
            Err(error) => {
                tracing::warn!(%error, "auth state carried an invalid shop domain");
                return;
            }
        };

        self.sessions
            .put(ShopSession::new(shop.clone(), auth.scope, host.clone()));

        let subscription = WebhookSubscription {
            shop: shop.clone(),
            access_token: auth.access_token,
            topic: WebhookTopic::AppUninstalled,
            path: WEBHOOKS_PATH.to_string(),
        };
        if let Err(error) = self.registrar.register(&subscription).await {
            tracing::warn!(shop = %shop, %error, "failed to register app/uninstalled webhook");
        }

        ctx.redirect(&root_location(shop.as_ref(), &host));
    }

    /// Returns the handler that deletes a shop's session when its
    /// `app/uninstalled` webhook fires.
    #[must_use]
    pub fn uninstall_handler(&self) -> AppUninstalledHandler {
        AppUninstalledHandler::new(self.sessions.clone())
    }
}

fn root_location(shop: &str, host: &str) -> String {
    format!("/?shop={}&host={}", encode(shop), encode(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_to_is_302() {
        let redirect = Redirect::to("/auth");
        assert_eq!(redirect.status, 302);
        assert_eq!(redirect.location, "/auth");
    }

    #[test]
    fn test_root_location_encodes_values() {
        let location = root_location("demo.myshopify.com", "aG9z dA==");
        assert_eq!(location, "/?shop=demo.myshopify.com&host=aG9z%20dA%3D%3D");
    }
}
