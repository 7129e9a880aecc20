//! Marker serialization errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("can't get an end record for a component that was not prerendered")]
    NotPrerendered,

    #[error("component parameter serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MarkerResult<T> = Result<T, MarkerError>;
