//! HTTP helpers for the JSON API with consistent timeouts and error handling. Both
//! request channels are thin wrappers around [`HttpTransport`], which decides once per
//! response whether it carries a body, a semantic `{error}` payload, or an authorization
//! failure. The helpers never log credentials or payloads.

use super::{
    config::AppConfig,
    errors::{AppError, RequestError},
};
use crate::features::auth::{
    refresh::{RefreshCoordinator, RefreshOutcome},
    state::SessionStore,
};
use reqwest::{header::ACCEPT, Client, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Response payload handed back to callers; decoding into typed structs is left to the
/// feature clients.
pub type Body = Value;

/// Classified server response.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Reply {
    Body(Body),
    SemanticError(String),
    /// The distinguished `401` status: the credential is missing, invalid or expired.
    Unauthorized(String),
}

/// Whether a pending request has already been replayed after a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryState {
    NotRetried,
    Retried,
}

/// A unit of work submitted to a request channel.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    method: Method,
    target: String,
    payload: Option<Value>,
    retry: RetryState,
}

impl PendingRequest {
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            method,
            target: target.into(),
            payload,
            retry: RetryState::NotRetried,
        }
    }

    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target, None)
    }

    #[must_use]
    pub fn post(target: impl Into<String>, payload: Value) -> Self {
        Self::new(Method::POST, target, Some(payload))
    }

    #[must_use]
    pub fn patch(target: impl Into<String>, payload: Value) -> Self {
        Self::new(Method::PATCH, target, Some(payload))
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn retry_state(&self) -> RetryState {
        self.retry
    }

    /// Flips the marker to `Retried`. Returns `false` when it was already set.
    pub fn mark_retried(&mut self) -> bool {
        match self.retry {
            RetryState::NotRetried => {
                self.retry = RetryState::Retried;
                true
            }
            RetryState::Retried => false,
        }
    }
}

/// Shared HTTP client bound to the configured API base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    /// Returns `RequestError::Config` if the base URL is invalid or the client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, RequestError> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|err| RequestError::Config(format!("Failed to initialize HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Sends one request and classifies the response. Never retries.
    #[instrument(skip_all, fields(method = %request.method(), path = request.target()))]
    pub(crate) async fn dispatch(
        &self,
        request: &PendingRequest,
        credential: Option<&SecretString>,
    ) -> Result<Reply, RequestError> {
        let url = build_url_with_base(&self.base_url, request.target());
        let mut builder = self
            .client
            .request(request.method().clone(), url)
            .header(ACCEPT, "application/json");

        if let Some(token) = credential
            .map(|secret| secret.expose_secret())
            .filter(|token| !token.is_empty())
        {
            builder = builder.bearer_auth(token);
        }

        if let Some(payload) = request.payload() {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let reply = classify_response(response).await?;

        debug!(unauthorized = matches!(reply, Reply::Unauthorized(_)), "response classified");

        Ok(reply)
    }
}

/// Request channel for calls that do not require a session.
#[derive(Clone, Debug)]
pub struct PublicChannel {
    transport: Arc<HttpTransport>,
}

impl PublicChannel {
    #[must_use]
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Sends a request without credentials. Failures are returned untouched; a `401`
    /// here is a semantic rejection (for example a bad login), not an expired session.
    /// # Errors
    /// Returns `AppError::Request` for transport failures and `AppError::RemoteRejected`
    /// when the service answers with an `{error}` payload.
    pub async fn send(
        &self,
        method: Method,
        target: &str,
        payload: Option<Value>,
    ) -> Result<Body, AppError> {
        let request = PendingRequest::new(method, target, payload);

        match self.transport.dispatch(&request, None).await? {
            Reply::Body(body) => Ok(body),
            Reply::SemanticError(message) | Reply::Unauthorized(message) => {
                Err(AppError::RemoteRejected(message))
            }
        }
    }
}

/// Request channel for calls that require a session. An authorization failure joins
/// the process-wide refresh and replays the request once with the renewed credential.
#[derive(Clone)]
pub struct AuthenticatedChannel {
    transport: Arc<HttpTransport>,
    store: SessionStore,
    refresh: Arc<RefreshCoordinator>,
}

impl AuthenticatedChannel {
    #[must_use]
    pub fn new(
        transport: Arc<HttpTransport>,
        store: SessionStore,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            store,
            refresh,
        }
    }

    /// # Errors
    /// See [`AuthenticatedChannel::dispatch`].
    pub async fn send(
        &self,
        method: Method,
        target: &str,
        payload: Option<Value>,
    ) -> Result<Body, AppError> {
        self.dispatch(PendingRequest::new(method, target, payload))
            .await
    }

    /// Dispatches `request` with the current credential.
    ///
    /// A `401` on the first attempt joins the single in-flight refresh; on success the
    /// request is replayed exactly once and that result is returned as-is. A `401` on the
    /// replay, or a failed refresh, ends with `AuthExpired` and an empty session.
    /// # Errors
    /// Returns `AppError::AuthExpired`, `AppError::RemoteRejected` or `AppError::Request`.
    #[instrument(skip_all, fields(method = %request.method(), path = request.target()))]
    pub async fn dispatch(&self, mut request: PendingRequest) -> Result<Body, AppError> {
        loop {
            let snapshot = self.store.snapshot();
            let credential = snapshot.session.as_ref().map(|session| session.access_token());

            let message = match self.transport.dispatch(&request, credential).await? {
                Reply::Body(body) => return Ok(body),
                Reply::SemanticError(message) => return Err(AppError::RemoteRejected(message)),
                Reply::Unauthorized(message) => message,
            };

            if request.retry_state() == RetryState::Retried {
                warn!(%message, "credential rejected after refresh; dropping session");
                self.store.clear_if_current(snapshot.generation);
                return Err(AppError::AuthExpired);
            }

            debug!(%message, generation = snapshot.generation, "credential rejected; joining refresh");

            match self.refresh.join(snapshot.generation).await {
                RefreshOutcome::Refreshed(_) => {
                    request.mark_retried();
                }
                RefreshOutcome::Failed => return Err(AppError::AuthExpired),
            }
        }
    }
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps reqwest errors into `RequestError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        RequestError::Serialization(format!("Failed to build request: {err}"))
    } else if err.is_decode() {
        RequestError::Parse(format!("Failed to decode response: {err}"))
    } else {
        RequestError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn classify_response(response: Response) -> Result<Reply, RequestError> {
    let status = response.status();
    let body = response.text().await.map_err(map_request_error)?;
    classify(status, &body)
}

/// Decides what a response means. Called exactly once per response.
fn classify(status: StatusCode, body: &str) -> Result<Reply, RequestError> {
    let parsed = if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(body)
    };
    let error_message = parsed
        .as_ref()
        .ok()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .map(|message| sanitize_body(message.to_string()));

    if status == StatusCode::UNAUTHORIZED {
        return Ok(Reply::Unauthorized(
            error_message.unwrap_or_else(|| sanitize_body(body.to_string())),
        ));
    }

    if status.is_success() {
        let value = parsed
            .map_err(|err| RequestError::Parse(format!("Failed to decode response: {err}")))?;
        return Ok(match error_message {
            Some(message) => Reply::SemanticError(message),
            None => Reply::Body(value),
        });
    }

    if status.is_client_error() {
        if let Some(message) = error_message {
            return Ok(Reply::SemanticError(message));
        }
    }

    Err(RequestError::Http {
        status: status.as_u16(),
        message: sanitize_body(body.to_string()),
    })
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
