use crate::cli::{
    actions::{account, catalog, navigate, Action},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let client = globals.client()?;

    match action {
        Action::Movies => catalog::movies(&client).await,
        Action::Genres => catalog::genres(&client).await,
        Action::Recommended => catalog::recommended(&client).await,
        Action::Movie { imdb_id } => catalog::movie(&client, &imdb_id).await,
        Action::Review { imdb_id, text } => catalog::review(&client, &imdb_id, &text).await,
        Action::Register(args) => account::register(&client, args).await,
        Action::Login(args) => account::login(&client, args).await,
        Action::Logout => account::logout(&client).await,
        Action::Whoami => {
            account::whoami(&client);
            Ok(())
        }
        Action::Open { path } => navigate::open(&client, &path),
    }
}
