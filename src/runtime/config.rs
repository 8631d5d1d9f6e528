//! Console configuration.
//!
//! Loaded once from a TOML file, then overridden from the environment. Every
//! editor receives an immutable clone.
//!
//! ```toml
//! base_url = "https://auth.example.com"
//! api_prefix = "/api/v1"
//! auth_token = "..."
//! enable_names = true
//! operator_org = 7
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Overrides `base_url`.
pub const BASE_URL_ENV_VAR: &str = "CONSOLE_BASE_URL";
/// Overrides `auth_token`.
pub const AUTH_TOKEN_ENV_VAR: &str = "CONSOLE_AUTH_TOKEN";
/// Overrides `enable_names` (`true`/`false`/`1`/`0`).
pub const ENABLE_NAMES_ENV_VAR: &str = "CONSOLE_ENABLE_NAMES";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Settings shared by every editor the console opens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Identity server origin, e.g. `https://auth.example.com`.
    pub base_url: String,
    /// Path prefix of the REST API.
    pub api_prefix: String,
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Show users by full name instead of email.
    pub enable_names: bool,
    /// Limits the user directory to one organization.
    pub operator_org: Option<i64>,
    /// Intents an editor queues before senders wait.
    pub mailbox_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            api_prefix: "/api/v1".to_string(),
            auth_token: None,
            connect_timeout_ms: 3_000,
            request_timeout_ms: 10_000,
            enable_names: true,
            operator_org: None,
            mailbox_size: 32,
        }
    }
}

impl ConsoleConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::InvalidValue`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparseable override.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `CONSOLE_*` variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparseable override.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            self.base_url = base_url;
        }
        if let Some(token) = lookup(AUTH_TOKEN_ENV_VAR) {
            self.auth_token = (!token.trim().is_empty()).then_some(token);
        }
        if let Some(flag) = lookup(ENABLE_NAMES_ENV_VAR) {
            self.enable_names = parse_flag(ENABLE_NAMES_ENV_VAR, &flag)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                reason: format!("`{}` is not an http(s) url", self.base_url),
            });
        }
        if self.mailbox_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mailbox_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected a boolean, got `{other}`"),
        }),
    }
}
