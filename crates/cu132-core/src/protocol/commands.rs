//! Protocol commands
//!
//! Defines the commands the control unit answers and the replies it sends.

use serde::{Deserialize, Serialize};

/// Firmware version reported for the `0` command
pub const VERSION_PAYLOAD: &[u8] = b"5321";

/// Race status reply to a poll (starts with `:`)
pub const RACE_STATUS_PAYLOAD: &[u8] = b":TTTTTTVVSMBBAXX";

/// Sensor event reply to a poll
pub const SENSOR_EVENT_PAYLOAD: &[u8] = b"FBBBBBBBBG";

/// Commands understood by the control unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Query firmware version ('0' command)
    Version,

    /// Poll for the next status or sensor event ('?' command)
    Poll,

    /// Anything else, kept verbatim
    Unknown(Vec<u8>),
}

impl Command {
    /// Classify a command chunk
    ///
    /// Only a chunk that is exactly one known byte is a known command. A chunk
    /// carrying extra bytes is not reassembled or split.
    pub fn from_chunk(chunk: &[u8]) -> Self {
        match chunk {
            [b'0'] => Command::Version,
            [b'?'] => Command::Poll,
            other => Command::Unknown(other.to_vec()),
        }
    }

    /// Get the wire bytes of this command
    pub fn bytes(&self) -> &[u8] {
        match self {
            Command::Version => b"0",
            Command::Poll => b"?",
            Command::Unknown(raw) => raw,
        }
    }
}

/// Which reply a poll produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollReply {
    /// Race status update
    Status,
    /// Lap sensor event
    Sensor,
}

impl PollReply {
    /// Pick the reply for a drawn bit
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            PollReply::Status
        } else {
            PollReply::Sensor
        }
    }

    /// Get the reply payload
    pub fn payload(&self) -> &'static [u8] {
        match self {
            PollReply::Status => RACE_STATUS_PAYLOAD,
            PollReply::Sensor => SENSOR_EVENT_PAYLOAD,
        }
    }
}
