use crate::cli::{
    actions::Action,
    commands::{self, ARG_VERBOSITY},
    dispatch::handler,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Start the CLI
/// # Errors
/// Returns an error if logging cannot be initialized or the arguments are inconsistent.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).map_or(0, |&v| v);
    telemetry::init(Some(telemetry::level_from_verbosity(verbosity)))?;

    let globals = GlobalArgs::from_matches(&matches);
    let action = handler(&matches)?;

    Ok((action, globals))
}
