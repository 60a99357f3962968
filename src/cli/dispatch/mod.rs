use crate::cli::actions::{
    account::{LoginArgs, RegisterArgs},
    Action,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    // Closure to fetch a required string argument from the subcommand
    let required = |id: &str| -> Result<String> {
        sub.get_one::<String>(id)
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: {id}"))
    };
    let secret = |id: &str| -> Result<SecretString> { required(id).map(SecretString::from) };

    let action = match name {
        "movies" => Action::Movies,
        "genres" => Action::Genres,
        "register" => Action::Register(RegisterArgs {
            first_name: required("first-name")?,
            last_name: required("last-name")?,
            email: required("email")?,
            password: secret("password")?,
            confirm_password: secret("confirm-password")?,
            genres: sub
                .get_many::<String>("genre")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        }),
        "login" => Action::Login(LoginArgs {
            email: required("email")?,
            password: secret("password")?,
        }),
        "logout" => Action::Logout,
        "whoami" => Action::Whoami,
        "recommended" => Action::Recommended,
        "movie" => Action::Movie {
            imdb_id: required("imdb-id")?,
        },
        "review" => Action::Review {
            imdb_id: required("imdb-id")?,
            text: required("text")?,
        },
        "open" => Action::Open {
            path: required("path")?,
        },
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(action)
}
