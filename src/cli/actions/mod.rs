pub mod account;
pub mod catalog;
pub mod navigate;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Movies,
    Genres,
    Register(account::RegisterArgs),
    Login(account::LoginArgs),
    Logout,
    Whoami,
    Recommended,
    Movie { imdb_id: String },
    Review { imdb_id: String, text: String },
    Open { path: String },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
