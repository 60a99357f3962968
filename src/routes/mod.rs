//! Route table for the client. Only the protect/allow decision lives here; rendering is
//! up to the caller.

use crate::features::auth::{Navigation, RouteGuard};
use std::{fmt, sync::Arc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Register,
    Login,
    Recommended,
    Movie(String),
    Review(String),
    NotFound(String),
}

impl Route {
    /// Parses a navigation path, ignoring any query string or fragment.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["register"] => Self::Register,
            ["login"] => Self::Login,
            ["recommended"] => Self::Recommended,
            ["movie", imdb_id] => Self::Movie((*imdb_id).to_string()),
            ["review", imdb_id] => Self::Review((*imdb_id).to_string()),
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Routes that require a session.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Recommended | Self::Movie(_) | Self::Review(_))
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Register => "/register".to_string(),
            Self::Login => "/login".to_string(),
            Self::Recommended => "/recommended".to_string(),
            Self::Movie(imdb_id) => format!("/movie/{imdb_id}"),
            Self::Review(imdb_id) => format!("/review/{imdb_id}"),
            Self::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}

/// Navigation entry point: unprotected routes pass straight through, protected ones
/// go through the guard.
#[derive(Clone)]
pub struct Router {
    guard: Arc<RouteGuard>,
}

impl Router {
    #[must_use]
    pub fn new(guard: Arc<RouteGuard>) -> Self {
        Self { guard }
    }

    #[must_use]
    pub fn navigate(&self, path: &str) -> (Route, Navigation) {
        let route = Route::parse(path);
        let navigation = if route.is_protected() {
            self.guard.resolve(Navigation::pending(route.path()))
        } else {
            Navigation::Allowed {
                destination: route.path(),
            }
        };
        (route, navigation)
    }
}
