use crate::{
    app_lib::config::RuntimeConfig,
    cli::commands::{ARG_API_URL, ARG_SESSION_FILE, ARG_TIMEOUT_MS},
    AppConfig, MagicStream,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Session file used when neither `--session-file` nor `MAGICSTREAM_SESSION_FILE` is set.
const DEFAULT_SESSION_FILE: &str = ".config/magicstream/session.json";

#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub session_file: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl GlobalArgs {
    #[must_use]
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
            session_file: matches.get_one::<String>(ARG_SESSION_FILE).cloned(),
            timeout_ms: matches.get_one::<u64>(ARG_TIMEOUT_MS).copied(),
        }
    }

    /// Build-time defaults with these arguments applied on top.
    /// # Errors
    /// Returns an error if the resulting API base URL is unusable.
    pub fn config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::with_overrides(RuntimeConfig::new(
            self.api_url.as_deref(),
            self.timeout_ms,
            self.session_file.as_deref(),
        ));

        if config.session_file.is_none() {
            config.session_file = default_session_file();
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn client(&self) -> Result<MagicStream> {
        let config = self.config()?;
        MagicStream::new(config).context("failed to create the MagicStream client")
    }
}

fn default_session_file() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_SESSION_FILE))
}
