//! Error types for the formdata crate.

use std::io;
use thiserror::Error;

/// The main error type for the formdata crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation was invoked in a state that does not allow it.
    ///
    /// The serializer that returned this error cannot be resumed.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The output sink (or a streamed body source) failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A boundary, header name or header value cannot be written as framing bytes.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The OS entropy source failed while generating a boundary.
    #[error("Boundary generation failed: {0}")]
    BoundaryGeneration(String),
}

/// Specialized Result type for formdata operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Error::ProtocolViolation(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Reports whether the error came from the sink or a body source.
    pub fn is_sink_failure(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
