//! Engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to invoke engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine exited with status {status}: {stderr}")]
    Command { status: i32, stderr: String },

    #[error("engine output is not valid UTF-8")]
    Unreadable,

    #[error("engine reported an unparseable version: {0}")]
    BadVersion(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("version conflict: {0}")]
    Conflict(String),

    #[error("engine did not finish within {0} seconds")]
    TimedOut(u64),
}
