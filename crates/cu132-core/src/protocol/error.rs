//! Protocol errors

use thiserror::Error;

/// Errors that can occur during protocol communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Session cancelled")]
    Cancelled,

    #[error("Reply is missing the '$' terminator")]
    MissingTerminator,

    #[error("Reply too short: {0} bytes")]
    ReplyTooShort(usize),

    #[error("Reply too long: {len} bytes (max {max})")]
    ReplyTooLong { len: usize, max: usize },

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },

    #[error("Invalid version reply: {0:?}")]
    InvalidVersion(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProtocolError {
    /// Whether this error is the cooperative shutdown signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProtocolError::Cancelled)
    }
}
