//! Session state for the client. The store owns the only copy of the signed-in
//! identity; every mutation goes through `set` or `clear`, replaces the session
//! wholesale, bumps the generation, and notifies consumers before returning.

use crate::features::auth::types::Session;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::debug;

/// Callback invoked synchronously after every mutation, with the store's write lock
/// held. Must not call back into the store. Runs on whatever task mutated the store,
/// which may be a tokio worker, so it should stay short: the session cache's small file
/// write is the heaviest observer in this crate.
pub type SessionObserver = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Consistent view of the store at one point in time.
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub session: Option<Arc<Session>>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_valid())
    }
}

struct Inner {
    state: watch::Sender<SessionSnapshot>,
    observers: RwLock<Vec<SessionObserver>>,
    // serializes write + notify so observers see mutations in order
    write_lock: Mutex<()>,
}

/// In-memory session store shared by the guard, both channels and identity flows.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                state,
                observers: RwLock::new(Vec::new()),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the current session, if any.
    #[must_use]
    pub fn read(&self) -> Option<Arc<Session>> {
        self.inner.state.borrow().session.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Replaces the session wholesale.
    pub fn set(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        debug!(user_id = %session.user_id, "session set");
        self.mutate(|_| true, Some(session.clone()));
        session
    }

    /// Drops the session.
    pub fn clear(&self) {
        debug!("session cleared");
        self.mutate(|_| true, None);
    }

    /// Drops the session only if nothing replaced it since `generation`.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        let cleared = self.mutate(|snapshot| snapshot.generation == generation, None);
        if cleared {
            debug!(generation, "session cleared");
        }
        cleared
    }

    /// Subscribes to session changes for async consumers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Registers a synchronous observer.
    pub fn observe(&self, observer: SessionObserver) {
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    fn mutate(
        &self,
        precondition: impl Fn(&SessionSnapshot) -> bool,
        session: Option<Arc<Session>>,
    ) -> bool {
        let _write = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let applied = self.inner.state.send_if_modified(|snapshot| {
            if !precondition(snapshot) {
                return false;
            }
            snapshot.generation += 1;
            snapshot.session = session;
            true
        });

        if applied {
            let snapshot = self.snapshot();
            let observers = self
                .inner
                .observers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for observer in &observers {
                observer(&snapshot);
            }
        }

        applied
    }
}
