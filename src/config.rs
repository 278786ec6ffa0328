//! Client configuration: deserialization and validation.
//!
//! The file is optional. Every key has a default so an empty document (or no
//! file at all) yields a working configuration that talks to the public API
//! with the token from `$OCM_TOKEN`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::RosaError;

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

fn default_api_url() -> String {
    "https://api.openshift.com".to_string()
}

fn default_token() -> String {
    "${OCM_TOKEN}".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_poll_timeout_secs() -> u64 {
    900
}

/// Top-level client configuration, parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RosaConfig {
    /// Base URL of the cluster-management API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token as a `${VAR}` reference, resolved at client construction.
    #[serde(default = "default_token")]
    pub token: String,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Minimum wait between credential polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Overall deadline for a credential poll.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for RosaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: default_token(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl RosaConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(source: &str, content: &str) -> crate::Result<Self> {
        let config: RosaConfig = toml::from_str(content)
            .map_err(|e| RosaError::Config(source.to_string(), e.to_string()))?;
        config.validate(source)?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let source = path.display().to_string();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RosaError::Io(source.clone(), e.to_string()))?;
        Self::from_toml(&source, &content)
    }

    /// Validate the config, failing fast before any request is made.
    pub fn validate(&self, source: &str) -> crate::Result<()> {
        let invalid = |msg: String| Err(RosaError::Config(source.to_string(), msg));

        match url::Url::parse(&self.api_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return invalid(format!(
                    "api_url must use http or https, got '{}'",
                    parsed.scheme()
                ));
            }
            Err(e) => return invalid(format!("api_url '{}' is not a valid URL: {}", self.api_url, e)),
        }

        if parse_env_ref(&self.token).is_none() {
            return invalid(format!(
                "token must be a ${{VAR}} reference, got '{}'",
                self.token
            ));
        }

        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs must be > 0".to_string());
        }
        if self.poll_interval_secs == 0 {
            return invalid("poll_interval_secs must be > 0".to_string());
        }
        if self.poll_interval_secs >= self.poll_timeout_secs {
            return invalid(format!(
                "poll_interval_secs ({}) must be less than poll_timeout_secs ({})",
                self.poll_interval_secs, self.poll_timeout_secs
            ));
        }

        Ok(())
    }

    /// Resolve the token reference against the environment. Unset variables
    /// resolve to the empty string.
    pub fn resolve_token(&self) -> String {
        match parse_env_ref(&self.token) {
            Some(var) => std::env::var(var).unwrap_or_default(),
            None => String::new(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}
