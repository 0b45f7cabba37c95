//! # Shopify Auth Bridge
//!
//! A compatibility layer that lets a Shopify OAuth middleware written for
//! one web framework run inside another. The host framework hands each
//! request to the bridge; the bridge either answers with a redirect, adapts
//! the request into the context shape the middleware expects and delegates,
//! or passes the request through.
//!
//! ## Overview
//!
//! The bridge provides:
//! - Request adaptation via [`adapter::convert`] and [`AdaptedContext`],
//!   including case-normalized headers, set-cookie reconciliation, and
//!   signed cookies
//! - An in-memory shop session registry behind the injectable
//!   [`SessionStore`] trait
//! - Route dispatch via [`AuthRouter`]: default-shop redirects, the `/auth`
//!   entry point, middleware delegation, and the already-authenticated
//!   short-circuit
//! - `app/uninstalled` webhook registration after OAuth and session removal
//!   when the webhook fires
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopify_bridge::session::MemorySessionStore;
//! use shopify_bridge::webhooks::GraphqlWebhookRegistrar;
//! use shopify_bridge::{AuthRouter, BridgeConfig, InboundRequest, RouteOutcome};
//! use std::sync::Arc;
//!
//! # async fn run(middleware: Arc<dyn shopify_bridge::AuthMiddleware>) {
//! // Fails fast if any of SHOPIFY_API_KEY, SHOPIFY_API_SECRET, SCOPES,
//! // HOST, or SHOP is unset.
//! let config = BridgeConfig::from_env().unwrap();
//!
//! let sessions = Arc::new(MemorySessionStore::new());
//! let registrar = Arc::new(GraphqlWebhookRegistrar::new(config.host().clone()));
//! let router = AuthRouter::new(config, sessions, middleware, registrar);
//!
//! // In the host framework's request hook:
//! let request = InboundRequest::new("myapp.example.com", "/");
//! match router.handle(&request).await {
//!     RouteOutcome::Redirect(redirect) => { /* answer with redirect */ }
//!     RouteOutcome::Adapted(ctx) => { /* render ctx.status() and headers */ }
//!     RouteOutcome::Passthrough => { /* framework default handling */ }
//! }
//! # }
//! ```
//!
//! ## Sessions are volatile
//!
//! The in-memory store forces every shop to re-authenticate when the
//! process restarts. Production deployments should implement
//! [`SessionStore`] over a persistent key-value store.
//!
//! ## Design Principles
//!
//! - **No global state**: the session registry and configuration are owned
//!   by the router and injected explicitly
//! - **Explicit results**: middleware failure is a value, not a caught
//!   exception; the router logs it and returns the context as-is
//! - **Narrow seams**: the middleware consumes capability traits
//!   ([`adapter::HeaderReader`], [`adapter::HeaderWriter`],
//!   [`adapter::StatusSetter`], [`adapter::Redirector`]) rather than a
//!   structural copy of a foreign framework's context type

pub mod adapter;
pub mod config;
pub mod error;
pub mod middleware;
pub mod request;
pub mod router;
pub mod session;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use adapter::{convert, AdaptedContext};
pub use config::{ApiKey, ApiSecretKey, AuthScopes, BridgeConfig, BridgeConfigBuilder, HostUrl, ShopDomain};
pub use error::ConfigError;
pub use middleware::{AuthMiddleware, AuthState, MiddlewareError};
pub use request::InboundRequest;
pub use router::{AuthRouter, Redirect, RouteOutcome};
pub use session::{MemorySessionStore, SessionStore, ShopSession};
