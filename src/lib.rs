//! Session-aware client for the MagicStream movie catalog.
//!
//! The crate holds the signed-in identity in a single [`SessionStore`], gates protected
//! routes through a [`RouteGuard`], and sends requests over two channels: a public one
//! for catalog browsing, registration and login, and an authenticated one that recovers
//! from an expired credential by joining a single in-flight refresh and replaying the
//! original request at most once.
//!
//! [`SessionStore`]: features::auth::state::SessionStore
//! [`RouteGuard`]: features::auth::guards::RouteGuard

pub mod app;
#[path = "lib/mod.rs"]
pub mod app_lib;
pub mod cli;
pub mod features;
pub mod routes;

pub use app::MagicStream;
pub use app_lib::{AppConfig, AppError, RequestError};
