//! Configuration management

use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "NTFYBOT_CONFIG";

/// Config file used when `NTFYBOT_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ntfy/bot.yml";

/// Bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub token: String,
    pub user_commands: Vec<UserCommand>,
}

/// A static command answered with a canned response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCommand {
    pub command: String,
    pub description: String,
    pub response: String,
}

impl Config {
    /// Resolve the config path from the environment, falling back to the default
    pub fn path_from_env() -> PathBuf {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::MissingField("token".to_string()));
        }
        if self.user_commands.is_empty() {
            return Err(ConfigError::MissingField("user_commands".to_string()));
        }
        Ok(())
    }
}
