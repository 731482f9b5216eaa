//! Errors raised by the variable store

use thiserror::Error;

/// Variable store errors
#[derive(Error, Debug)]
pub enum VariableError {
    #[error("failed to parse variables document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to serialize variables: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VariableError>;
