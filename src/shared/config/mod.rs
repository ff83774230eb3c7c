//! Application configuration module
//!
//! Provides the validated configuration types used by the polling client.
//! Values come from a TOML file and environment overrides (see
//! `client::config`) and always pass through [`AppConfigBuilder::build`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::messaging::Role;

/// Poll timing knobs, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Delay before the first message poll after mounting
    pub initial_ms: u64,
    /// Delay used right after a tick that saw new messages
    pub min_ms: u64,
    /// Upper bound for the idle back-off
    pub max_ms: u64,
    /// Idle back-off increment
    pub step_ms: u64,
    /// Fixed period of the admin conversation-list timer
    pub conversation_list_ms: u64,
    /// How long the typing flag stays up after the last keystroke
    pub typing_reset_ms: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            initial_ms: 2000,
            min_ms: 1000,
            max_ms: 5000,
            step_ms: 500,
            conversation_list_ms: 3000,
            typing_reset_ms: 1000,
        }
    }
}

impl ScheduleSettings {
    /// Check the bounds are ordered and non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_ms == 0 || self.step_ms == 0 {
            return Err(ConfigError::InvalidSchedule(
                "min_ms and step_ms must be greater than zero".to_string(),
            ));
        }
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidSchedule(format!(
                "min_ms ({}) exceeds max_ms ({})",
                self.min_ms, self.max_ms
            )));
        }
        if self.initial_ms < self.min_ms || self.initial_ms > self.max_ms {
            return Err(ConfigError::InvalidSchedule(format!(
                "initial_ms ({}) must lie within [{}, {}]",
                self.initial_ms, self.min_ms, self.max_ms
            )));
        }
        if self.conversation_list_ms == 0 || self.typing_reset_ms == 0 {
            return Err(ConfigError::InvalidSchedule(
                "conversation_list_ms and typing_reset_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the conversation store, without trailing slash
    pub server_url: String,
    /// Bearer token identifying the caller
    pub token: Option<String>,
    /// Which side of the conversation this client acts as
    pub role: Role,
    /// Poll timing
    pub schedule: ScheduleSettings,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.server_url)?;
        self.schedule.validate()
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    token: Option<String>,
    role: Option<Role>,
    schedule: Option<ScheduleSettings>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the caller's role (defaults to client)
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the poll timing
    pub fn schedule(mut self, schedule: ScheduleSettings) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let server_url = self
            .server_url
            .ok_or(ConfigError::MissingValue("server_url"))?
            .trim()
            .trim_end_matches('/')
            .to_string();

        let config = AppConfig {
            server_url,
            token: self.token.filter(|t| !t.trim().is_empty()),
            role: self.role.unwrap_or(Role::Client),
            schedule: self.schedule.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidUrl(url.to_string()))?;
    if rest.is_empty() {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }
    Ok(())
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
