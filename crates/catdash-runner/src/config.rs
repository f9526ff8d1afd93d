use std::time::Duration;

use serde::Deserialize;

use catdash_core::config::{ConfigError, SimConfig};
use catdash_core::level::{BuiltinLevel, FileLevel, LevelProvider};

/// Highest accepted frame rate. Faster rates round down to a zero-length
/// frame interval, which tokio refuses.
pub const MAX_FRAME_RATE_HZ: u32 = 1000;

/// Runner configuration, loaded from `config/catdash.toml`.
///
/// The simulation sections (`[physics]`, `[timing]`, ...) live at the top level
/// of the same file, next to the runner's own keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub frame_rate_hz: u32,
    /// Level file (`.toml` or `.json`). The built-in stage is used when unset.
    pub level_path: Option<String>,
    /// How long the headless demo runs before stopping.
    pub demo_secs: u64,
    #[serde(flatten)]
    pub sim: SimConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            level_path: None,
            demo_secs: 10,
            sim: SimConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load config from the file named by `CATDASH_CONFIG` (default
    /// `config/catdash.toml`) if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let path =
            std::env::var("CATDASH_CONFIG").unwrap_or_else(|_| "config/catdash.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!(path, "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(path, "No config file found, using defaults");
                RunnerConfig::default()
            },
        };

        if let Ok(val) = std::env::var("CATDASH_FRAME_RATE")
            && let Ok(hz) = val.parse::<u32>()
        {
            config.frame_rate_hz = hz;
        }
        if let Ok(level) = std::env::var("CATDASH_LEVEL")
            && !level.is_empty()
        {
            config.level_path = Some(level);
        }

        config
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str::<RunnerConfig>(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate_hz == 0 || self.frame_rate_hz > MAX_FRAME_RATE_HZ {
            return Err(ConfigError::Invalid {
                field: "frame_rate_hz",
                reason: "must be between 1 and 1000",
            });
        }
        self.sim.validate()
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate_hz.max(1)))
    }

    pub fn level_provider(&self) -> Box<dyn LevelProvider> {
        match &self.level_path {
            Some(path) => Box::new(FileLevel::new(path)),
            None => Box::new(BuiltinLevel),
        }
    }
}
