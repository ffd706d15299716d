use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_POLL_INTERVAL_MS: u32 = 8;
const DEFAULT_RUMBLE_DURATION_MS: u32 = 250;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u8),
    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogLevel {
    #[default]
    Info,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    /// Replay polling period.
    pub poll_interval_ms: u32,
    /// Used for capture rumble steps that carry no duration.
    pub rumble_duration_ms: u32,
    pub log_level: LogLevel,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            rumble_duration_ms: DEFAULT_RUMBLE_DURATION_MS,
            log_level: LogLevel::Info,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    poll_interval_ms: Option<u32>,
    rumble_duration_ms: Option<u32>,
    log_level: Option<LogLevel>,
    color: Option<bool>,
}

impl ConfigV1 {
    fn into_config(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let poll_interval_ms = self.poll_interval_ms.unwrap_or(defaults.poll_interval_ms);
        if poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(Config {
            poll_interval_ms,
            rumble_duration_ms: self
                .rumble_duration_ms
                .unwrap_or(defaults.rumble_duration_ms),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            color: self.color.unwrap_or(defaults.color),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

/// Parse yaml config.
pub(crate) fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    match raw.version {
        1 => {
            let config: ConfigV1 = serde_yaml::from_str(input)?;
            config.into_config()
        }
        version => Err(ConfigError::UnsupportedVersion(version)),
    }
}

/// Loads the config at `path`, or the defaults when no path is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => Ok(Config::default()),
    }
}
