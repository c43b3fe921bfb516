use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PORT: u16 = 4830;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LIMIT: u32 = 50;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 200;

const ENV_BASE_URL: &str = "SIGHTLINE_SYSTEM_BASE_URL";
const ENV_PORT: &str = "SIGHTLINE_PORT";
const ENV_TIMEOUT: &str = "SIGHTLINE_UPSTREAM_TIMEOUT_SECS";

/// Knobs the timeline builder and fan-out read on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    pub default_limit: u32,
    pub min_limit: u32,
    pub max_limit: u32,
    pub upstream_timeout: Duration,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            min_limit: MIN_LIMIT,
            max_limit: MAX_LIMIT,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub system_base_url: String,
    pub port: u16,
    pub upstream_timeout_secs: u64,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl Settings {
    /// Reads the optional TOML file, then layers `SIGHTLINE_*` variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.system_base_url = url.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT).and_then(|value| value.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT).and_then(|value| value.trim().parse().ok()) {
            self.upstream_timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "system_base_url must not be empty".to_string(),
            });
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "upstream_timeout_secs must be positive".to_string(),
            });
        }
        if self.max_limit < MIN_LIMIT {
            return Err(ConfigError::Invalid {
                message: format!("max_limit must be at least {MIN_LIMIT}"),
            });
        }
        if !(MIN_LIMIT..=self.max_limit).contains(&self.default_limit) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_limit must be within [{MIN_LIMIT}, {}]",
                    self.max_limit
                ),
            });
        }
        Ok(())
    }

    pub fn timeline(&self) -> TimelineConfig {
        TimelineConfig {
            default_limit: self.default_limit,
            min_limit: MIN_LIMIT,
            max_limit: self.max_limit,
            upstream_timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }
}
