use catdash_core::config::ConfigError;
use catdash_core::level::LevelError;

#[derive(Debug)]
pub enum RunnerError {
    /// No render surface is attached; the run is not started.
    SurfaceUnavailable,
    Config(ConfigError),
    Level(LevelError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceUnavailable => write!(f, "render surface unavailable"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Level(e) => write!(f, "level: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SurfaceUnavailable => None,
            Self::Config(e) => Some(e),
            Self::Level(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunnerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LevelError> for RunnerError {
    fn from(e: LevelError) -> Self {
        Self::Level(e)
    }
}
