use crate::engine::{EngineSettings, PICK_PAUSE, ROUND_SECONDS, TIMEOUT_PAUSE};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_ROUND_SECONDS: u32 = 600;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig
{
    pub round_seconds: u32,
    pub pick_pause_ms: u64,
    pub timeout_pause_ms: u64,
    /// Fixed seed for reproducible palettes. Unset means OS entropy.
    pub seed: Option<u64>,
    /// Where tracing output goes. Unset disables logging, since the game owns the terminal.
    pub log_file: Option<PathBuf>,
}

impl Default for GameConfig
{
    fn default() -> Self
    {
        Self {
            round_seconds: ROUND_SECONDS,
            pick_pause_ms: PICK_PAUSE.as_millis() as u64,
            timeout_pause_ms: TIMEOUT_PAUSE.as_millis() as u64,
            seed: None,
            log_file: None,
        }
    }
}

impl GameConfig
{
    pub fn load(path: &Path) -> Result<Self, ConfigError>
    {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError>
    {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError>
    {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError>
    {
        if self.round_seconds == 0 {
            return Err(ConfigError::Invalid("round_seconds must be at least 1".to_string()));
        }
        if self.round_seconds > MAX_ROUND_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "round_seconds must be at most {MAX_ROUND_SECONDS}"
            )));
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings
    {
        EngineSettings {
            round_seconds: self.round_seconds,
            pick_pause: Duration::from_millis(self.pick_pause_ms),
            timeout_pause: Duration::from_millis(self.timeout_pause_ms),
        }
    }
}
