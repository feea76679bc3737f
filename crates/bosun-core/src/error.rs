//! Client error types

use bosun_engine::EngineError;
use bosun_models::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict: {0}")]
    Conflict(String),

    #[error("engine failure: {0}")]
    Engine(EngineError),
}

impl From<EngineError> for ClientError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(what) => ClientError::NotFound(what),
            EngineError::Conflict(what) => ClientError::Conflict(what),
            other => ClientError::Engine(other),
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err.to_string())
    }
}
