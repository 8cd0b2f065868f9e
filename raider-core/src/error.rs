use thiserror::Error;

/// Unified error type for Raider.
///
/// Only terminal conditions are represented here. Resolution/extraction
/// warnings are logged in place via `tracing::warn!` and never surface as
/// a `RaiderError`.
#[derive(Error, Debug)]
pub enum RaiderError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("{0}")]
    Aborted(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("authentication loop exceeded {0} steps")]
    LoopGuard(usize),

    #[error("plugin error: {0}")]
    Plugin(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl RaiderError {
    /// Process exit code a driver should surface for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RaiderError::UnknownStage(_) => 2,
            RaiderError::LoopGuard(_) => 3,
            RaiderError::Transport(_) => 4,
            _ => 1,
        }
    }
}
