use crate::{
    app_lib::AppError,
    features::auth::{guards::LOGIN_PATH, Navigation},
    routes::Route,
    MagicStream,
};
use anyhow::{anyhow, bail, Result};

/// Enters a route through the router. Protected routes without a session fail with
/// the login redirect.
/// # Errors
/// Returns an error when the guard denies the navigation.
pub fn enter(client: &MagicStream, path: &str) -> Result<Route> {
    let (route, navigation) = client.router().navigate(path);

    match navigation {
        Navigation::Allowed { .. } => Ok(route),
        Navigation::Denied {
            requested,
            redirect_to,
        } => Err(anyhow!(
            "Login required to open {requested}. Redirecting to {redirect_to}; \
             run `magicstream login` to continue there"
        )),
        Navigation::Pending { destination } => {
            Err(anyhow!("navigation to {destination} was not resolved"))
        }
    }
}

/// Turns a client error into the message shown to the user. An expired session also
/// names the login page.
#[must_use]
pub fn report(err: AppError) -> anyhow::Error {
    if err.is_auth_expired() {
        anyhow!("{err} Redirecting to {LOGIN_PATH}")
    } else {
        err.into()
    }
}

/// Checks a route against the current session without calling the service.
/// # Errors
/// Returns an error for unknown routes or when the guard denies the navigation.
pub fn open(client: &MagicStream, path: &str) -> Result<()> {
    let route = enter(client, path)?;
    if let Route::NotFound(path) = route {
        bail!("No page at {path}");
    }

    println!("{route}: allowed");
    Ok(())
}
