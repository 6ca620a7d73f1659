// src/error.rs

use std::any::Any;

use thiserror::Error;

/// Which stage of the pipeline (or the transport around it) produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Footer, magic bytes or schema could not be read.
    Format,
    /// Footer was valid but page or column data could not be decoded.
    Decode,
    /// Upload was missing, empty or too large. Raised by the transport only.
    Input,
    /// A runtime fault (panic) inside the reader.
    Internal,
}

/// Every failure the parse pipeline can report. The message is what ends up
/// in the `{"error": ...}` body, so it carries the underlying text unchanged.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Input(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ParseError {
    pub fn format(err: impl ToString) -> Self {
        ParseError::Format(err.to_string())
    }

    pub fn decode(err: impl ToString) -> Self {
        ParseError::Decode(err.to_string())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        ParseError::Input(msg.into())
    }

    /// Build an `Internal` error from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "reader panicked".to_string()
        };
        ParseError::Internal(msg)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Format(_) => ErrorKind::Format,
            ParseError::Decode(_) => ErrorKind::Decode,
            ParseError::Input(_) => ErrorKind::Input,
            ParseError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type ParseOutcome<T> = std::result::Result<T, ParseError>;
