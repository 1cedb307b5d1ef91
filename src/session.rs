//! Session state: the stored bearer token and the 401 teardown
//!
//! The token lives in the local key/value store under `authToken`, the same
//! key the browser client used. Invalidation clears it and sends the
//! navigator to the login route.

use crate::layout::{Navigator, Route};
use crate::storage::{KeyValueStore, StorageResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Callback run when the session is torn down
pub type TeardownHook = Box<dyn Fn() + Send + Sync>;

/// Authentication session bound to a key/value store
pub struct Session {
    store: Mutex<Box<dyn KeyValueStore>>,
    navigator: Arc<Navigator>,
    teardown: Mutex<Vec<TeardownHook>>,
}

impl Session {
    pub fn new(store: Box<dyn KeyValueStore>, navigator: Arc<Navigator>) -> Self {
        Self {
            store: Mutex::new(store),
            navigator,
            teardown: Mutex::new(Vec::new()),
        }
    }

    /// Registers a callback run by `invalidate` after the token is cleared
    pub fn on_teardown(&self, hook: TeardownHook) {
        self.teardown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(hook);
    }

    /// Returns the stored bearer token, if any
    ///
    /// A storage failure is logged and treated as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store().get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.store().set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> StorageResult<()> {
        self.store().remove(TOKEN_KEY)
    }

    /// Handles a rejected session: clears the token, runs the teardown hooks
    /// and redirects to login
    pub fn invalidate(&self) {
        tracing::warn!("Session rejected by API, clearing token");
        if let Err(e) = self.clear_token() {
            tracing::error!("Failed to clear session token: {}", e);
        }
        for hook in self.teardown.lock().unwrap_or_else(|e| e.into_inner()).iter() {
            hook();
        }
        self.navigator.navigate(Route::Login);
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    fn store(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.token().is_some())
            .finish()
    }
}
