//! The seam to the external OAuth middleware.
//!
//! The middleware itself is an opaque collaborator: it runs the OAuth dance
//! against Shopify, reading and writing headers and cookies through the
//! adapted context. The bridge only defines the contract it is invoked
//! through and the state it deposits on success. Failure is an explicit
//! [`MiddlewareError`] result rather than a caught exception; the router
//! decides what to do with it.

use crate::adapter::AdaptedContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A boxed future, used for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What the middleware deposits on the context after a successful OAuth
/// completion.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthState {
    /// The shop that completed OAuth.
    pub shop: String,

    /// The access token granted for the shop.
    pub access_token: String,

    /// The granted scope string.
    pub scope: String,
}

impl fmt::Debug for AuthState {
    // The access token is a credential; keep it out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("shop", &self.shop)
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Errors the middleware can report.
///
/// The router logs and swallows these: the partially mutated context is
/// returned to the host framework regardless, which interprets whatever
/// status and headers resulted.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// The OAuth flow failed.
    #[error("OAuth flow failed: {message}")]
    AuthFailed {
        /// Description of the failure.
        message: String,
    },

    /// The middleware aborted the request with a status code.
    #[error("middleware aborted with status {status}")]
    Aborted {
        /// The status code set on the context.
        status: u16,
    },
}

/// The external authentication middleware contract.
///
/// Implementations run the OAuth dance, mutating the context through its
/// capability surface. Test code supplies fakes.
pub trait AuthMiddleware: Send + Sync {
    /// Runs the middleware against the adapted context.
    fn authenticate<'a>(
        &'a self,
        ctx: &'a mut AdaptedContext,
    ) -> BoxFuture<'a, Result<(), MiddlewareError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_state_debug_masks_access_token() {
        let state = AuthState {
            shop: "demo.myshopify.com".to_string(),
            access_token: "shpat_secret_token".to_string(),
            scope: "read_products".to_string(),
        };

        let debug = format!("{state:?}");
        assert!(!debug.contains("shpat_secret_token"));
        assert!(debug.contains("demo.myshopify.com"));
    }

    #[test]
    fn test_auth_state_serde_round_trip() {
        let state = AuthState {
            shop: "demo.myshopify.com".to_string(),
            access_token: "token".to_string(),
            scope: "read_products".to_string(),
        };

        let json = serde_json::to_string(&state).unwrap();
        let back: AuthState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_middleware_error_messages() {
        let error = MiddlewareError::AuthFailed {
            message: "cookie mismatch".to_string(),
        };
        assert!(error.to_string().contains("cookie mismatch"));

        let error = MiddlewareError::Aborted { status: 403 };
        assert!(error.to_string().contains("403"));
    }
}
