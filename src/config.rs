//! Client configuration: API base URL, durable session location and request
//! timeout. Values come from the environment and may be overridden by the
//! command line. Configuration values are public; do not store secrets here.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

/// Default request timeout applied by the transport client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// File name of the durable session record inside the state directory.
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Loads config from `PARRAIN_API_BASE_URL` and falls back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url = env::var("PARRAIN_API_BASE_URL")
            .ok()
            .and_then(|value| normalize_value(&value))
            .unwrap_or_default();

        Self {
            api_base_url,
            session_file: default_session_file(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Applies explicit overrides, ignoring blank values.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(value) = overrides.api_base_url.as_deref().and_then(normalize_value) {
            self.api_base_url = value;
        }
        if let Some(value) = overrides.session_file {
            if !value.as_os_str().is_empty() {
                self.session_file = value;
            }
        }
        if let Some(value) = overrides.request_timeout {
            if !value.is_zero() {
                self.request_timeout = value;
            }
        }
    }
}

/// Values supplied by the command line on top of the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
}

fn default_session_file() -> PathBuf {
    let base = env::var("XDG_STATE_HOME")
        .ok()
        .and_then(|value| normalize_value(&value))
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .and_then(|value| normalize_value(&value))
                .map(|home| Path::new(&home).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(env!("CARGO_PKG_NAME")).join(SESSION_FILE_NAME)
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
