use crate::{
    cli::actions::navigate::report,
    features::{
        auth::{LoginRequest, RegisterForm},
        movies::Genre,
    },
    MagicStream,
};
use anyhow::{bail, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub genres: Vec<String>,
}

pub async fn login(client: &MagicStream, args: LoginArgs) -> Result<()> {
    let request = LoginRequest {
        email: args.email,
        password: args.password,
    };
    let outcome = client.identity().login(&request).await.map_err(report)?;

    println!(
        "Logged in as {}. Continue at {}",
        outcome.session.display_name(),
        outcome.destination
    );
    Ok(())
}

pub async fn register(client: &MagicStream, args: RegisterArgs) -> Result<()> {
    let available = client.catalog().genres().await.map_err(report)?;
    let favorite_genres = resolve_genres(&args.genres, &available)?;

    let form = RegisterForm {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password: args.password,
        confirm_password: args.confirm_password,
        favorite_genres,
    };
    let next = client.identity().register(&form).await.map_err(report)?;

    println!("Registered {}. Log in at {next}", form.email.trim());
    Ok(())
}

pub async fn logout(client: &MagicStream) -> Result<()> {
    if let Err(err) = client.identity().logout().await {
        bail!("Logged out locally, but the service reported: {err}");
    }

    println!("Logged out.");
    Ok(())
}

pub fn whoami(client: &MagicStream) {
    let Some(session) = client.session().read() else {
        println!("Not logged in.");
        return;
    };

    let genres = session
        .favorite_genres
        .iter()
        .map(|genre| genre.genre_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!("{} <{}>", session.display_name(), session.email);
    println!("Role: {:?}", session.role);
    println!("Favorite genres: {genres}");
}

/// Matches genre names against the service's list, ignoring case. Duplicates collapse.
/// # Errors
/// Returns an error naming the first unknown genre.
pub fn resolve_genres(names: &[String], available: &[Genre]) -> Result<Vec<Genre>> {
    let mut resolved: Vec<Genre> = Vec::with_capacity(names.len());

    for name in names {
        let name = name.trim();
        let Some(genre) = available
            .iter()
            .find(|genre| genre.genre_name.eq_ignore_ascii_case(name))
        else {
            bail!("Unknown genre: {name}");
        };

        if !resolved.contains(genre) {
            resolved.push(genre.clone());
        }
    }

    Ok(resolved)
}
