pub mod config;
pub mod error;
pub mod session;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use session::{RunBroadcast, RunCommand, Surface, spawn_run_session};
