//! Application context
//!
//! One `AppContext` is built at startup and passed to every hook and page.
//! It owns the session, the HTTP client, the query cache, the toast queue and
//! the navigator, and it is the only place they are torn down.

use crate::api::ApiClient;
use crate::config::Config;
use crate::layout::{Navigator, Route};
use crate::query::{Notifier, PollCadence, QueryCache};
use crate::session::Session;
use crate::storage::{self, KeyValueStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct AppContext {
    config: Config,
    navigator: Arc<Navigator>,
    session: Arc<Session>,
    client: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<Notifier>,
    cadence: PollCadence,
}

impl AppContext {
    /// Builds a context over an already-open key/value store
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `store` - Local store holding the session token
    ///
    /// # Returns
    ///
    /// * `Ok(AppContext)` - Ready to serve pages
    /// * `Err(LeadDeskError)` - The HTTP client could not be built
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> crate::Result<Self> {
        let navigator = Arc::new(Navigator::default());
        let session = Arc::new(Session::new(store, navigator.clone()));
        let client = ApiClient::new(&config.api, session.clone())?;
        let cache = Arc::new(QueryCache::new(Duration::from_millis(config.api.retry_delay_ms)));
        let cadence = PollCadence::from(&config.polling);

        // A rejected session drops every cached result, like an explicit logout
        let teardown_cache = cache.clone();
        session.on_teardown(Box::new(move || teardown_cache.clear()));

        Ok(Self {
            config,
            navigator,
            session,
            client,
            cache,
            notifier: Arc::new(Notifier::new()),
            cadence,
        })
    }

    /// Builds a context backed by the SQLite store at `config.session.store_path`
    pub fn open(config: Config) -> crate::Result<Self> {
        let store = storage::open_store(Path::new(&config.session.store_path))?;
        Self::new(config, Box::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn cadence(&self) -> PollCadence {
        self.cadence
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.token().is_some()
    }

    /// Stores `token` for subsequent requests and leaves the login route
    pub fn login(&self, token: &str) -> crate::Result<()> {
        self.session.set_token(token.trim())?;
        self.cache.clear();
        if self.navigator.current() == Route::Login {
            self.navigator.navigate(Route::Dashboard);
        }
        tracing::info!("Session token stored");
        Ok(())
    }

    /// Explicit teardown: token, cached results, then the login route
    pub fn logout(&self) -> crate::Result<()> {
        self.session.clear_token()?;
        self.cache.clear();
        self.navigator.navigate(Route::Login);
        tracing::info!("Logged out");
        Ok(())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("client", &self.client)
            .field("session", &self.session)
            .field("cache", &self.cache)
            .finish()
    }
}
