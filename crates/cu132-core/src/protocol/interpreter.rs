//! Command interpreter
//!
//! Runs one request/response exchange at a time:
//!
//! 1. Read a chunk. Anything other than the prefix `"` is answered with `#`.
//! 2. Read the command chunk and echo it back unframed.
//! 3. Answer `0` with the version, `?` with a status or sensor reply, and
//!    anything else with `#`.
//!
//! Exchanges are independent; nothing carries over from one to the next.

use serde::{Deserialize, Serialize};

use super::commands::VERSION_PAYLOAD;
use super::{BitSource, Command, Framer, PollReply, ProtocolError, Transport};
use super::{CMD_PREFIX, UNKNOWN_REPLY};

/// How an exchange was answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    /// Version info sent
    Version,
    /// Poll answered with the given reply
    Poll(PollReply),
    /// Command echoed, then `#`
    UnknownCommand(Vec<u8>),
    /// First chunk was not the prefix; `#` sent without echo
    UnknownPrefix(Vec<u8>),
}

/// Answers control unit commands
pub struct Interpreter<B: BitSource> {
    poll_bits: B,
}

impl<B: BitSource> Interpreter<B> {
    /// Create an interpreter drawing poll replies from `poll_bits`
    pub fn new(poll_bits: B) -> Self {
        Self { poll_bits }
    }

    /// Run one exchange over `framer`
    pub fn exchange<T: Transport>(
        &mut self,
        framer: &mut Framer<T>,
    ) -> Result<Exchange, ProtocolError> {
        let prefix = framer.next_chunk()?;
        if prefix != [CMD_PREFIX] {
            tracing::debug!("Unrecognized prefix, {} byte(s)", prefix.len());
            framer.send_plain(&[UNKNOWN_REPLY])?;
            return Ok(Exchange::UnknownPrefix(prefix));
        }

        tracing::debug!("CMD received");
        let chunk = framer.next_chunk()?;
        framer.send_plain(&chunk)?;

        match Command::from_chunk(&chunk) {
            Command::Version => {
                framer.send_checksummed(VERSION_PAYLOAD)?;
                Ok(Exchange::Version)
            }
            Command::Poll => {
                let reply = PollReply::from_bit(self.poll_bits.next_bit());
                framer.send_checksummed(reply.payload())?;
                Ok(Exchange::Poll(reply))
            }
            Command::Unknown(raw) => {
                framer.send_plain(&[UNKNOWN_REPLY])?;
                Ok(Exchange::UnknownCommand(raw))
            }
        }
    }

    /// Get the poll bit source
    pub fn bit_source_mut(&mut self) -> &mut B {
        &mut self.poll_bits
    }
}
