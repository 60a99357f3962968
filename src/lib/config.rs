//! Build-time configuration for the API endpoint with runtime overrides. The runtime
//! values come from CLI flags or their environment variables, so a single binary can
//! target different deployments. Configuration values are public; do not store secrets
//! here.

use super::{errors::RequestError, APP_USER_AGENT};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Default request timeout (milliseconds) applied to both request channels.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Client configuration derived from build-time environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub session_file: Option<PathBuf>,
    pub user_agent: String,
}

impl AppConfig {
    /// Loads config from build-time environment variables.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url = option_env!("MAGICSTREAM_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL);

        Self {
            api_base_url: api_base_url.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_file: None,
            user_agent: APP_USER_AGENT.to_string(),
        }
    }

    /// Loads the build-time defaults and applies the provided overrides.
    #[must_use]
    pub fn with_overrides(runtime: RuntimeConfig) -> Self {
        let mut config = Self::load();
        apply_runtime_overrides(&mut config, runtime);
        config
    }

    /// Rejects base URLs that cannot carry requests.
    /// # Errors
    /// Returns `RequestError::Config` when the base URL is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), RequestError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| {
            RequestError::Config(format!("Invalid API base URL `{}`: {err}", self.api_base_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RequestError::Config(format!(
                "Unsupported API base URL scheme: {scheme}"
            ))),
        }
    }
}

/// Optional values provided at runtime; `None` keeps the build-time default.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub session_file: Option<String>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new(
        api_base_url: Option<&str>,
        timeout_ms: Option<u64>,
        session_file: Option<&str>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.and_then(normalize_runtime_value),
            timeout_ms: timeout_ms.filter(|ms| *ms > 0),
            session_file: session_file.and_then(normalize_runtime_value),
        }
    }
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.timeout_ms {
        config.timeout = Duration::from_millis(value);
    }
    if let Some(value) = runtime.session_file {
        config.session_file = Some(PathBuf::from(value));
    }
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> AppConfig {
        AppConfig {
            api_base_url: "https://api.default".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_file: None,
            user_agent: APP_USER_AGENT.to_string(),
        }
    }

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  https://api.magicstream.dev "),
            Some("https://api.magicstream.dev".to_string())
        );
    }

    #[test]
    fn apply_runtime_overrides_ignores_empty_values() {
        let mut config = default_config();
        let runtime = RuntimeConfig::new(Some("  "), Some(0), Some(""));

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.default");
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.session_file, None);
    }

    #[test]
    fn apply_runtime_overrides_overwrites_when_present() {
        let mut config = default_config();
        let runtime = RuntimeConfig::new(
            Some("https://api.override"),
            Some(2_500),
            Some("/tmp/magicstream-session.json"),
        );

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.timeout, Duration::from_millis(2_500));
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/tmp/magicstream-session.json"))
        );
    }

    #[test]
    fn validate_rejects_relative_and_foreign_urls() {
        let mut config = default_config();
        assert!(config.validate().is_ok());

        config.api_base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(RequestError::Config(_))));

        config.api_base_url = "ftp://movies.example".to_string();
        assert!(matches!(config.validate(), Err(RequestError::Config(_))));
    }
}
