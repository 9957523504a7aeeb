//! Error types for the request/response pipeline.
//!
//! Server-reported failures (`invalid`, `no-access`, ...) are *not* errors:
//! they are ordinary status codes on the [`StatusEnvelope`](crate::StatusEnvelope).
//! An [`ApiError`] describes a failure of the pipeline itself and travels
//! attached to the envelope it spoiled.

use std::fmt;
use thiserror::Error;

/// The category of a pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network failure, timeout or non-success HTTP status.
    Transport,
    /// The response body is not a well-formed status envelope.
    Parse,
    /// The payload does not match the expected record shape.
    Decode,
    /// A required identifier was not supplied; no request was sent.
    Missing,
    /// The client settings are unusable.
    Configuration,
    /// A compensating delete after a failed create did not succeed.
    Compensation,
}

impl ErrorKind {
    /// Returns a short, stable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Decode => "decode",
            Self::Missing => "missing",
            Self::Configuration => "configuration",
            Self::Compensation => "compensation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by the pipeline.
#[derive(Debug, Error)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Creates an error for a required field that was not supplied.
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(ErrorKind::Missing, format!("required field `{field}` is missing"))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn compensation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Compensation, message)
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl From<breeze_core::ValueError> for ApiError {
    fn from(err: breeze_core::ValueError) -> Self {
        Self::decode(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for pipeline operations.
pub type ApiResult<T> = Result<T, ApiError>;
