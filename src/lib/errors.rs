use thiserror::Error;

/// Transport or server failures unrelated to authorization. Never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// Local precondition violation; never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The credential was rejected and could not be renewed. The session is gone.
    #[error("Session expired. Please log in again.")]
    AuthExpired,
    /// The service answered with an `{error}` payload.
    #[error("{0}")]
    RemoteRejected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Errors after which the caller must treat the user as logged out.
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}
