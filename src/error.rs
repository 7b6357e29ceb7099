//! Error types for rtmpmux

use crate::StreamKind;
use thiserror::Error;

/// Result type alias for rtmpmux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types reported to producer call sites
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Producer call after `close()`
    #[error("stream closed")]
    StreamClosed,

    /// Producer call before the codec for its stream was configured
    #[error("no {0} codec configured")]
    CodecNotConfigured(StreamKind),

    /// The message queue is at capacity
    #[error("message queue full ({capacity} messages)")]
    QueueSaturated { capacity: usize },

    /// Invalid input parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Error code for FFI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum ErrorCode {
    /// Success
    Ok = 0,
    /// Invalid input parameter
    InvalidInput = 1,
    /// Stream closed
    StreamClosed = 2,
    /// Codec not configured
    CodecNotConfigured = 3,
    /// Queue saturated
    QueueSaturated = 4,
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::StreamClosed => ErrorCode::StreamClosed,
            Error::CodecNotConfigured(_) => ErrorCode::CodecNotConfigured,
            Error::QueueSaturated { .. } => ErrorCode::QueueSaturated,
            Error::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }
}
