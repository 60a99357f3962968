//! Identity flows: login, registration, logout and refresh. Together with the refresh
//! coordinator these are the only writers of session state. Credentials are passed as
//! `SecretString` and exposed only while building the wire payload.

use crate::{
    app_lib::{AppError, AuthenticatedChannel, PublicChannel, RequestError},
    features::auth::{
        guards::{RouteGuard, LOGIN_PATH},
        refresh::{RefreshCoordinator, RefreshOutcome},
        state::SessionStore,
        storage::SessionCache,
        types::{
            LoginPayload, LoginRequest, LogoutPayload, RegisterForm, RegisterRequest, Role,
            Session, SessionDescriptor,
        },
    },
};
use regex::Regex;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Landing page after login when no destination was remembered.
pub const DEFAULT_LANDING_PATH: &str = "/";

/// Successful login: the new session and where to navigate next.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub session: Arc<Session>,
    pub destination: String,
}

pub struct IdentityFlows {
    public: PublicChannel,
    private: AuthenticatedChannel,
    store: SessionStore,
    guard: Arc<RouteGuard>,
    refresh: Arc<RefreshCoordinator>,
}

impl IdentityFlows {
    #[must_use]
    pub fn new(
        public: PublicChannel,
        private: AuthenticatedChannel,
        store: SessionStore,
        guard: Arc<RouteGuard>,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            public,
            private,
            store,
            guard,
            refresh,
        }
    }

    /// Logs in and stores the returned session. The store is untouched on failure.
    /// # Errors
    /// `Validation` for empty fields, `RemoteRejected` for bad credentials, `Request` for
    /// transport failures or a malformed descriptor.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AppError> {
        let email = request.email.trim();
        let password = request.password.expose_secret();
        if email.is_empty() || password.trim().is_empty() {
            return Err(AppError::validation("Email and password are required."));
        }

        let payload = to_payload(&LoginPayload { email, password })?;
        let body = self.public.send(Method::POST, "/login", Some(payload)).await?;
        let descriptor: SessionDescriptor = serde_json::from_value(body)
            .map_err(|err| RequestError::Parse(format!("Failed to decode session: {err}")))?;
        let session = self.store.set(Session::try_from(descriptor)?);

        let destination = self
            .guard
            .take_remembered()
            .unwrap_or_else(|| DEFAULT_LANDING_PATH.to_string());

        info!(user_id = %session.user_id, %destination, "logged in");

        Ok(LoginOutcome {
            session,
            destination,
        })
    }

    /// Registers a new account. Does not establish a session; returns the login path the
    /// user should be sent to next.
    /// # Errors
    /// `Validation` when the form fails local checks (nothing is sent), otherwise the
    /// public channel's errors.
    #[instrument(skip_all)]
    pub async fn register(&self, form: &RegisterForm) -> Result<&'static str, AppError> {
        validate_registration(form)?;

        let payload = to_payload(&RegisterRequest {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: form.email.trim(),
            password: form.password.expose_secret(),
            role: Role::User,
            favorite_genres: &form.favorite_genres,
        })?;
        self.public
            .send(Method::POST, "/register", Some(payload))
            .await?;

        info!("registration accepted");
        Ok(LOGIN_PATH)
    }

    /// Ends the session. The local session is always cleared, even when the remote call
    /// fails; that failure is still returned so callers can report it.
    /// # Errors
    /// Returns the remote logout error, after the session has been cleared.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), AppError> {
        let remote = match self.store.read() {
            Some(session) => match to_payload(&LogoutPayload {
                user_id: &session.user_id,
            }) {
                Ok(payload) => self
                    .private
                    .send(Method::POST, "/logout", Some(payload))
                    .await
                    .map(|_| ()),
                Err(err) => Err(err),
            },
            None => Ok(()),
        };

        self.store.clear();

        if let Err(err) = &remote {
            warn!("remote logout failed; local session cleared anyway: {err}");
        } else {
            info!("logged out");
        }

        remote
    }

    /// Exchanges the current refresh credential for a new session, joining any refresh
    /// already in flight.
    /// # Errors
    /// Returns `AuthExpired` when the refresh fails; the session is cleared.
    pub async fn refresh(&self) -> Result<Arc<Session>, AppError> {
        match self.refresh.join(self.store.generation()).await {
            RefreshOutcome::Refreshed(session) => Ok(session),
            RefreshOutcome::Failed => Err(AppError::AuthExpired),
        }
    }

    /// Loads a cached session into the store. Returns whether one was found.
    pub fn rehydrate(&self, cache: &SessionCache) -> bool {
        match cache.load() {
            Some(session) => {
                info!(user_id = %session.user_id, "session rehydrated from cache");
                self.store.set(session);
                true
            }
            None => false,
        }
    }
}

fn to_payload<T: Serialize>(payload: &T) -> Result<Value, AppError> {
    serde_json::to_value(payload)
        .map_err(|err| RequestError::Serialization(format!("Failed to encode request: {err}")).into())
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Local checks run before a registration ever reaches the network.
/// # Errors
/// Returns `AppError::Validation` describing the first failed check.
pub fn validate_registration(form: &RegisterForm) -> Result<(), AppError> {
    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Err(AppError::validation("First and last name are required."));
    }
    if !valid_email(form.email.trim()) {
        return Err(AppError::validation("A valid email address is required."));
    }
    if form.password.expose_secret().is_empty() {
        return Err(AppError::validation("Password is required."));
    }
    if form.password.expose_secret() != form.confirm_password.expose_secret() {
        return Err(AppError::validation("Passwords do not match"));
    }
    if form.favorite_genres.is_empty() {
        return Err(AppError::validation("Select at least one favorite genre."));
    }
    Ok(())
}
