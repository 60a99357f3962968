use crate::features::auth::state::SessionStore;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

/// Login entry point that denied navigations are redirected to.
pub const LOGIN_PATH: &str = "/login";

/// Called with the new remembered destination whenever it is recorded or consumed.
pub type DestinationObserver = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// One navigation attempt through the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The session store has not been consulted yet.
    Pending { destination: String },
    Allowed { destination: String },
    Denied {
        requested: String,
        redirect_to: String,
    },
}

impl Navigation {
    #[must_use]
    pub fn pending(destination: impl Into<String>) -> Self {
        Self::Pending {
            destination: destination.into(),
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Where the caller should render: the destination when allowed, the redirect
    /// when denied.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Pending { destination } | Self::Allowed { destination } => destination,
            Self::Denied { redirect_to, .. } => redirect_to,
        }
    }
}

/// Gates protected views on session presence and remembers the denied destination
/// for the next successful login. UX only; the API enforces access.
pub struct RouteGuard {
    store: SessionStore,
    remembered: Mutex<Option<String>>,
    observers: RwLock<Vec<DestinationObserver>>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            remembered: Mutex::new(None),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Seeds the remembered destination, e.g. from a previous run. Observers are not
    /// notified.
    pub fn restore(&self, destination: impl Into<String>) {
        *self.lock_remembered() = Some(destination.into());
    }

    /// Registers an observer for changes to the remembered destination.
    pub fn observe(&self, observer: DestinationObserver) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Resolves a pending navigation. Already-resolved navigations are returned as-is.
    #[must_use]
    pub fn resolve(&self, navigation: Navigation) -> Navigation {
        let Navigation::Pending { destination } = navigation else {
            return navigation;
        };

        if self.store.is_authenticated() {
            return Navigation::Allowed { destination };
        }

        info!(%destination, "protected route denied; redirecting to login");
        *self.lock_remembered() = Some(destination.clone());
        self.notify(Some(&destination));

        Navigation::Denied {
            requested: destination,
            redirect_to: LOGIN_PATH.to_string(),
        }
    }

    /// Convenience for `resolve(Navigation::pending(destination))`.
    #[must_use]
    pub fn check(&self, destination: &str) -> Navigation {
        self.resolve(Navigation::pending(destination))
    }

    #[must_use]
    pub fn remembered(&self) -> Option<String> {
        self.lock_remembered().clone()
    }

    /// Consumes the remembered destination; a second call returns `None`.
    pub fn take_remembered(&self) -> Option<String> {
        let taken = self.lock_remembered().take();
        if taken.is_some() {
            self.notify(None);
        }
        taken
    }

    fn notify(&self, destination: Option<&str>) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in &observers {
            observer(destination);
        }
    }

    fn lock_remembered(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.remembered.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
