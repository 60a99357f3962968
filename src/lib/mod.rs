//! Shared client utilities for API access, configuration, errors, and build metadata.
//!
//! ## Request Channels
//!
//! 1. **Public:** catalog browsing, genre listing, registration and login. No credential
//!    is attached and failures are returned as-is.
//! 2. **Authenticated:** every call carries the session's access credential as an
//!    `Authorization: Bearer` header. A `401` triggers the single-flight refresh and one
//!    replay of the original request.
//!
//! Centralizing these helpers keeps network behavior consistent and avoids duplicated
//! logic in features. Callers must still avoid logging credentials or payloads.

pub mod api;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub(crate) mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod errors;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub use api::{AuthenticatedChannel, Body, HttpTransport, PendingRequest, PublicChannel, RetryState};
pub use config::AppConfig;
pub use errors::{AppError, RequestError};
