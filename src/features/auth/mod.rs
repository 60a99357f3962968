//! Auth feature module covering the session store, route guard, identity flows and the
//! single-flight refresh. This module touches security boundaries and must avoid
//! logging secrets or token material.
//!
//! Flow Overview: Login posts credentials over the public channel and stores the
//! returned descriptor. Protected routes consult the guard, which redirects to `/login`
//! and remembers where the user was going. Authenticated calls that hit a `401` join a
//! single refresh and replay once; a failed refresh clears the session.

pub mod client;
pub mod guards;
pub mod refresh;
pub mod state;
pub mod storage;
pub mod types;

pub use client::{IdentityFlows, LoginOutcome};
pub use guards::{Navigation, RouteGuard};
pub use state::{SessionSnapshot, SessionStore};
pub use types::{LoginRequest, RegisterForm, Role, Session};
