//! Errors raised while decoding server payloads into the data model.

use std::fmt;

/// Errors that can occur while interpreting server-supplied data.
#[derive(Debug)]
pub enum ModelError {
    /// The payload was not valid JSON or did not match the expected shape.
    Json(serde_json::Error),
    /// A report result set arrived without its `cluster` field.
    MissingCluster,
    /// A report section was not an object with `epoch` and `results`.
    MalformedReport(String),
    /// An epoch could not be represented as a calendar timestamp.
    EpochOutOfRange(i64),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Json(e) => write!(f, "invalid payload: {e}"),
            ModelError::MissingCluster => write!(f, "report set has no cluster"),
            ModelError::MalformedReport(name) => write!(f, "malformed report section: {name}"),
            ModelError::EpochOutOfRange(epoch) => write!(f, "epoch out of range: {epoch}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Json(e) => Some(e),
            ModelError::MissingCluster
            | ModelError::MalformedReport(_)
            | ModelError::EpochOutOfRange(_) => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Json(e)
    }
}

/// Result type for model decoding.
pub type ModelResult<T> = Result<T, ModelError>;
