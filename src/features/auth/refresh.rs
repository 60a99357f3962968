//! Single-flight credential refresh.
//!
//! Callers that saw their credential rejected pass the store generation they sent the
//! request under. The first one through the lock starts the exchange in a task owned by
//! the coordinator; the task keeps the lock until the store holds the result, so a caller
//! that gives up waiting never frees the slot for a second exchange. Everyone queued
//! behind it finds the generation moved on and adopts the result already in the store.

use crate::{
    app_lib::{api::Reply, AppError, HttpTransport, PendingRequest, RequestError},
    features::auth::{
        state::SessionStore,
        types::{Session, SessionDescriptor},
    },
};
use reqwest::Method;
use secrecy::ExposeSecret;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn, Instrument};

pub const REFRESH_PATH: &str = "/refresh";

#[derive(Clone, Debug)]
pub enum RefreshOutcome {
    Refreshed(Arc<Session>),
    Failed,
}

pub struct RefreshCoordinator {
    transport: Arc<HttpTransport>,
    store: SessionStore,
    in_flight: Arc<Mutex<()>>,
    attempts: AtomicU64,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(transport: Arc<HttpTransport>, store: SessionStore) -> Self {
        Self {
            transport,
            store,
            in_flight: Arc::new(Mutex::new(())),
            attempts: AtomicU64::new(0),
        }
    }

    /// Number of refresh exchanges started since creation.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Joins the in-flight refresh, or starts one if the session the caller was rejected
    /// under is still current. Dropping the returned future does not cancel a started
    /// exchange.
    #[instrument(skip(self))]
    pub async fn join(&self, observed_generation: u64) -> RefreshOutcome {
        let in_flight = Arc::clone(&self.in_flight).lock_owned().await;

        let snapshot = self.store.snapshot();
        if snapshot.generation != observed_generation {
            debug!(
                current = snapshot.generation,
                "session changed while waiting; adopting outcome"
            );
            return adopt(snapshot.session);
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);

        let transport = Arc::clone(&self.transport);
        let store = self.store.clone();
        let task = tokio::spawn(
            async move {
                let _in_flight = in_flight;
                match exchange(&transport, snapshot.session.as_deref()).await {
                    Ok(session) => {
                        info!(user_id = %session.user_id, "session refreshed");
                        RefreshOutcome::Refreshed(store.set(session))
                    }
                    Err(err) => {
                        warn!("session refresh failed: {err}");
                        store.clear();
                        RefreshOutcome::Failed
                    }
                }
            }
            .in_current_span(),
        );

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("refresh task aborted: {err}");
                let current = self.store.snapshot();
                if current.generation == observed_generation {
                    RefreshOutcome::Failed
                } else {
                    adopt(current.session)
                }
            }
        }
    }
}

fn adopt(session: Option<Arc<Session>>) -> RefreshOutcome {
    match session {
        Some(session) => RefreshOutcome::Refreshed(session),
        None => RefreshOutcome::Failed,
    }
}

async fn exchange(transport: &HttpTransport, current: Option<&Session>) -> Result<Session, AppError> {
    let Some(current) = current else {
        return Err(AppError::AuthExpired);
    };
    let refresh_token = current.refresh_token();
    if refresh_token.expose_secret().is_empty() {
        return Err(AppError::AuthExpired);
    }

    let request = PendingRequest::new(Method::POST, REFRESH_PATH, None);
    match transport.dispatch(&request, Some(refresh_token)).await? {
        Reply::Body(body) => {
            let descriptor: SessionDescriptor = serde_json::from_value(body).map_err(|err| {
                RequestError::Parse(format!("Failed to decode session: {err}"))
            })?;
            Ok(Session::try_from(descriptor)?)
        }
        Reply::SemanticError(message) => Err(AppError::RemoteRejected(message)),
        Reply::Unauthorized(_) => Err(AppError::AuthExpired),
    }
}
