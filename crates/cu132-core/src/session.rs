//! Session loop
//!
//! Drives exchanges one after another until cancelled or the transport fails.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::protocol::{BitSource, Exchange, Framer, Interpreter, PollReply, ProtocolError, Transport};

/// Cooperative shutdown flag shared with an interrupt handler
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether shutdown was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Counts of answered exchanges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Version requests answered
    pub version: u64,
    /// Polls answered with a race status
    pub status: u64,
    /// Polls answered with a sensor event
    pub sensor: u64,
    /// Unknown commands
    pub unknown_command: u64,
    /// Chunks that were not the command prefix
    pub unknown_prefix: u64,
}

impl SessionStats {
    /// Count one exchange
    pub fn record(&mut self, exchange: &Exchange) {
        match exchange {
            Exchange::Version => self.version += 1,
            Exchange::Poll(PollReply::Status) => self.status += 1,
            Exchange::Poll(PollReply::Sensor) => self.sensor += 1,
            Exchange::UnknownCommand(_) => self.unknown_command += 1,
            Exchange::UnknownPrefix(_) => self.unknown_prefix += 1,
        }
    }

    /// Total exchanges answered
    pub fn total(&self) -> u64 {
        self.version + self.status + self.sensor + self.unknown_command + self.unknown_prefix
    }
}

/// A single simulated control unit session
pub struct Session<T: Transport, B: BitSource> {
    framer: Framer<T>,
    interpreter: Interpreter<B>,
    stats: SessionStats,
}

impl<T: Transport, B: BitSource> Session<T, B> {
    /// Create a session; it stops when the framer's token is cancelled
    pub fn new(framer: Framer<T>, interpreter: Interpreter<B>) -> Self {
        Self {
            framer,
            interpreter,
            stats: SessionStats::default(),
        }
    }

    /// Run exactly one exchange
    pub fn run_once(&mut self) -> Result<Exchange, ProtocolError> {
        let exchange = self.interpreter.exchange(&mut self.framer)?;
        self.stats.record(&exchange);
        Ok(exchange)
    }

    /// Answer exchanges until cancelled
    ///
    /// Cancellation is checked between exchanges and while waiting for input.
    /// Transport errors end the session and are returned.
    pub fn run(&mut self) -> Result<SessionStats, ProtocolError> {
        tracing::info!("Simulator active");
        loop {
            if self.framer.cancel_token().is_cancelled() {
                break;
            }
            match self.run_once() {
                Ok(exchange) => tracing::debug!("Exchange complete: {:?}", exchange),
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    tracing::error!("Session failed after {} exchanges: {}", self.stats.total(), e);
                    return Err(e);
                }
            }
        }
        tracing::info!(
            "Simulator stopped after {} exchanges ({:?})",
            self.stats.total(),
            self.stats
        );
        Ok(self.stats)
    }

    /// Counts so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Get the framer
    pub fn framer(&self) -> &Framer<T> {
        &self.framer
    }

    /// Release the framer
    pub fn into_framer(self) -> Framer<T> {
        self.framer
    }
}
