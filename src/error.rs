use thiserror::Error;

use crate::engine::Phase;

/// Contract violations by whoever drives the engine. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError
{
    #[error("pick index {index} is outside the {cells}-cell palette")]
    InvalidPick { index: usize, cells: usize },

    #[error("no round is accepting picks (phase: {0:?})")]
    RoundNotActive(Phase),

    #[error("no round is waiting to start (phase: {0:?})")]
    NoPendingRound(Phase),

    #[error("game is still running (phase: {0:?})")]
    GameNotOver(Phase),
}

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum GameError
{
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
