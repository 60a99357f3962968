//! Wires the session store, both request channels, the refresh coordinator, the route
//! guard and the feature clients into one client instance.

use crate::{
    app_lib::{AppConfig, AuthenticatedChannel, HttpTransport, PublicChannel, RequestError},
    features::{
        auth::{
            refresh::RefreshCoordinator, storage::SessionCache, IdentityFlows, RouteGuard,
            SessionStore,
        },
        movies::CatalogClient,
    },
    routes::Router,
};
use std::sync::Arc;
use tracing::debug;

pub struct MagicStream {
    config: AppConfig,
    store: SessionStore,
    guard: Arc<RouteGuard>,
    refresh: Arc<RefreshCoordinator>,
    router: Router,
    identity: IdentityFlows,
    catalog: CatalogClient,
}

impl MagicStream {
    /// Builds a client. When `config.session_file` is set, a cached session and any
    /// remembered destination are loaded, and later changes to either are written back.
    /// # Errors
    /// Returns `RequestError::Config` if the HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Self, RequestError> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        let store = SessionStore::new();
        let refresh = Arc::new(RefreshCoordinator::new(transport.clone(), store.clone()));
        let guard = Arc::new(RouteGuard::new(store.clone()));

        let public = PublicChannel::new(transport.clone());
        let private = AuthenticatedChannel::new(transport, store.clone(), refresh.clone());

        let identity = IdentityFlows::new(
            public.clone(),
            private.clone(),
            store.clone(),
            guard.clone(),
            refresh.clone(),
        );
        let catalog = CatalogClient::new(public, private);
        let router = Router::new(guard.clone());

        let client = Self {
            config,
            store,
            guard,
            refresh,
            router,
            identity,
            catalog,
        };

        if let Some(path) = &client.config.session_file {
            let cache = SessionCache::new(path);
            let restored = client.identity.rehydrate(&cache);
            debug!(restored, path = %path.display(), "session cache attached");
            client.store.observe(cache.observer());

            if let Some(destination) = cache.load_destination() {
                debug!(%destination, "restored remembered destination");
                client.guard.restore(destination);
            }
            client.guard.observe(cache.destination_observer());
        }

        Ok(client)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityFlows {
        &self.identity
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Refresh exchanges started so far.
    #[must_use]
    pub fn refresh_attempts(&self) -> u64 {
        self.refresh.attempts()
    }
}
