//! Chunk framer
//!
//! Turns the transport's "whatever is available" reads into non-empty chunks
//! and sends replies back out, mirroring both directions to the wire log.

use std::ascii;
use std::thread;
use std::time::Duration;

use super::{frame, ProtocolError, Transport, DEFAULT_IDLE_POLL_MS, WIRE_TARGET};
use crate::session::CancelToken;

/// Render bytes for the wire log, escaping anything unprintable
pub(crate) fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|b| ascii::escape_default(*b))
        .map(char::from)
        .collect()
}

/// Owns the transport and frames traffic in both directions
pub struct Framer<T: Transport> {
    transport: T,
    cancel: CancelToken,
    idle_poll: Duration,
}

impl<T: Transport> Framer<T> {
    /// Create a framer over `transport`, observing `cancel` while idle
    pub fn new(transport: T, cancel: CancelToken) -> Self {
        Self {
            transport,
            cancel,
            idle_poll: Duration::from_millis(DEFAULT_IDLE_POLL_MS),
        }
    }

    /// Set the sleep between empty reads
    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    /// Block until the transport has at least one byte, then return it all
    ///
    /// Returns [`ProtocolError::Cancelled`] if the token is cancelled while
    /// waiting. A chunk that arrives after cancellation is still returned, but
    /// nothing can be written in reply to it.
    pub fn next_chunk(&mut self) -> Result<Vec<u8>, ProtocolError> {
        loop {
            let chunk = self.transport.read_available()?;
            if !chunk.is_empty() {
                tracing::info!(target: WIRE_TARGET, "read  {}", printable(&chunk));
                return Ok(chunk);
            }
            if self.cancel.is_cancelled() {
                return Err(ProtocolError::Cancelled);
            }
            if !self.idle_poll.is_zero() {
                thread::sleep(self.idle_poll);
            }
        }
    }

    /// Write bytes verbatim and flush
    ///
    /// Fails with [`ProtocolError::Cancelled`] once the token is cancelled, so
    /// no reply leaves after shutdown was requested.
    pub fn send_plain(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        if self.cancel.is_cancelled() {
            tracing::debug!("Dropping {} byte reply after cancel", bytes.len());
            return Err(ProtocolError::Cancelled);
        }
        self.transport.write_all(bytes)?;
        self.transport.flush()?;
        tracing::info!(target: WIRE_TARGET, "write  {}", printable(bytes));
        Ok(())
    }

    /// Write `<payload><checksum>$` and flush
    pub fn send_checksummed(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        self.send_plain(&frame(payload))
    }

    /// Cancellation token observed while idle
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}
