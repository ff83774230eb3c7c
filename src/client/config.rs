//! Client configuration
//!
//! Settings come from `<config dir>/realty-chat/client.toml` when present,
//! overlaid with `CHAT_SERVER_URL`, `CHAT_TOKEN` and `CHAT_ROLE`, and are
//! validated through [`AppConfig::builder`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, ScheduleSettings};
use crate::shared::messaging::Role;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Shape of `client.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server_url: Option<String>,
    token: Option<String>,
    role: Option<String>,
    #[serde(default)]
    schedule: Option<ScheduleSettings>,
}

/// Application configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let app = AppConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            role: Role::Client,
            schedule: ScheduleSettings::default(),
        };
        Self { app }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self { app: builder.build()? })
    }

    /// Where `load` looks for the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("realty-chat").join("client.toml"))
    }

    /// Load from the default file location plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Load from `path` (skipped when missing) plus environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if path.exists() => {
                tracing::debug!("Reading client config from {}", path.display());
                toml::from_str(&std::fs::read_to_string(path)?)?
            }
            _ => FileConfig::default(),
        };
        Self::resolve(file.with_env_overrides())
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::resolve(toml::from_str(contents)?)
    }

    fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let role = match file.role {
            Some(role) => role
                .parse::<Role>()
                .map_err(|_| ConfigError::InvalidRole(role))?,
            None => Role::Client,
        };

        let builder = AppConfig::builder()
            .server_url(file.server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()))
            .token(file.token)
            .role(role)
            .schedule(file.schedule.unwrap_or_default());
        Self::with_builder(builder)
    }

    /// Set the JWT token
    pub fn set_token(&mut self, token: Option<String>) {
        self.app.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.app.token.as_deref()
    }

    pub fn role(&self) -> Role {
        self.app.role
    }

    pub fn schedule(&self) -> &ScheduleSettings {
        &self.app.schedule
    }

    pub fn conversation_list_interval(&self) -> Duration {
        Duration::from_millis(self.app.schedule.conversation_list_ms)
    }

    pub fn typing_reset(&self) -> Duration {
        Duration::from_millis(self.app.schedule.typing_reset_ms)
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }
}

impl FileConfig {
    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CHAT_SERVER_URL") {
            self.server_url = Some(url);
        }
        if let Ok(token) = std::env::var("CHAT_TOKEN") {
            self.token = Some(token);
        }
        if let Ok(role) = std::env::var("CHAT_ROLE") {
            self.role = Some(role);
        }
        self
    }
}
