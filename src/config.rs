//! Console configuration: file, then environment, then command-line flags.

use serde::Deserialize;
use std::path::Path;

use crate::theme::PresentationMode;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const ENV_API_URL: &str = "SCHEMA_STUDIO_API_URL";
pub const ENV_TOKEN: &str = "SCHEMA_STUDIO_TOKEN";
pub const ENV_THEME: &str = "SCHEMA_STUDIO_THEME";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown presentation mode: {0}")]
    Theme(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    pub project: Option<String>,
    pub theme: PresentationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            project: None,
            theme: PresentationMode::default(),
        }
    }
}

impl Config {
    pub fn from_toml(input: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Load `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let display = path.display().to_string();
                let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: display.clone(),
                    source,
                })?;
                Self::from_toml(&input, &display)?
            }
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup. The API URL variable is
    /// read by the command-line parser, which applies it after this.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        if let Some(theme) = lookup(ENV_THEME) {
            self.theme = PresentationMode::from_str(&theme).ok_or(ConfigError::Theme(theme))?;
        }
        Ok(self)
    }

    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
