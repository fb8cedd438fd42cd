pub mod config;
pub mod engine;
pub mod error;
pub mod games;
pub mod logging;

pub use config::GameConfig;
pub use engine::{DisplayUpdate, EngineSettings, RoundEngine, RoundState};
pub use error::{ConfigError, EngineError, GameError};
