use std::fmt;

use thiserror::Error;

/// Error carried by request body stream items.
///
/// Wraps a human-readable message from whatever produced the stream
/// (the server connection, a decoding middleware, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyError {
    message: String,
}

impl BodyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BodyError {}

impl From<String> for BodyError {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for BodyError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors raised by the request context and body reader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("no http context was provided")]
    MissingContext,

    #[error("body reader has been completed")]
    ReaderCompleted,

    #[error("a read is already outstanding; call advance_to before reading again")]
    ReadInProgress,

    #[error("advance_to called without an outstanding read")]
    NoReadInProgress,

    #[error("invalid advance: consumed {consumed}, examined {examined}, buffered {buffered}")]
    InvalidAdvance {
        consumed: usize,
        examined: usize,
        buffered: usize,
    },

    #[error("request body error: {0}")]
    Body(#[from] BodyError),
}

pub type HttpResult<T> = Result<T, HttpError>;
