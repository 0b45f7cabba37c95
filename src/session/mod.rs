//! Shop session registry.
//!
//! A [`ShopSession`] records what the bridge needs to know about a shop that
//! has completed OAuth: the granted scope and the opaque `host` parameter
//! used for redirect construction. Sessions live behind the injectable
//! [`SessionStore`] trait; [`MemorySessionStore`] is the in-process
//! implementation.
//!
//! # Example
//!
//! ```rust
//! use shopify_bridge::session::{MemorySessionStore, SessionStore, ShopSession};
//! use shopify_bridge::ShopDomain;
//!
//! let store = MemorySessionStore::new();
//! let shop = ShopDomain::new("demo-shop").unwrap();
//!
//! store.put(ShopSession::new(shop.clone(), "read_products", "host-param"));
//! assert!(store.get(&shop).is_some());
//!
//! store.delete(&shop);
//! assert!(store.get(&shop).is_none());
//! ```

use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Post-authentication metadata for a single shop.
///
/// Created when OAuth completes, deleted when an `app/uninstalled` webhook
/// arrives for the shop.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShopSession {
    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The granted OAuth scope string.
    pub scope: String,

    /// The opaque host parameter used for redirect construction.
    pub host: String,

    /// When OAuth completed for this shop.
    pub created_at: DateTime<Utc>,
}

impl ShopSession {
    /// Creates a session stamped with the current time.
    #[must_use]
    pub fn new(shop: ShopDomain, scope: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            shop,
            scope: scope.into(),
            host: host.into(),
            created_at: Utc::now(),
        }
    }
}

/// An injectable shop session store.
///
/// The router only needs point reads and writes keyed by shop domain.
/// Implementations must be `Send + Sync`; the in-memory variant below is
/// lock-based, and a persistent key-value variant can back the same seam.
pub trait SessionStore: Send + Sync {
    /// Returns the session for the given shop, if one exists.
    fn get(&self, shop: &ShopDomain) -> Option<ShopSession>;

    /// Stores a session, replacing any existing one for the same shop.
    fn put(&self, session: ShopSession);

    /// Deletes the session for the given shop. Deleting an unknown shop is
    /// a no-op.
    fn delete(&self, shop: &ShopDomain);
}

/// An in-memory, in-process session store.
///
/// Volatile by design: sessions are lost on restart and every shop must
/// re-authenticate. This is the placeholder the production deployment is
/// expected to replace with a persistent store behind the same trait.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<ShopDomain, ShopSession>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().expect("session store lock poisoned").len()
    }

    /// Returns `true` if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, shop: &ShopDomain) -> Option<ShopSession> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(shop)
            .cloned()
    }

    fn put(&self, session: ShopSession) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(session.shop.clone(), session);
    }

    fn delete(&self, shop: &ShopDomain) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(shop);
    }
}

// Verify the store is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemorySessionStore>();
};
