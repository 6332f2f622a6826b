//! # CU132 Simulator Core Library
//!
//! Protocol core for the CU132 serial control unit simulator.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Checksum computation and reply framing for the control unit protocol
//! - A chunk framer over any byte transport (serial port, stdio, memory)
//! - The command interpreter answering version and poll requests
//! - A cancellable session loop driving one exchange after another
//! - Client-side reply decoding (version, race status, sensor events)
//! - Simulator configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use cu132_core::prelude::*;
//!
//! let config = SimulatorConfig::default();
//! let port = open_port(&config.port)?;
//! let framer = Framer::new(SerialTransport::new(port), CancelToken::new());
//! let mut session = Session::new(framer, Interpreter::new(RandomBits::from_entropy()));
//! let stats = session.run()?;
//! ```

pub mod config;
pub mod protocol;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, Parity, PortSettings, SimulatorConfig};
    pub use crate::protocol::{
        checksum, frame, open_port, verify, BitSource, Command, Exchange, Framer, Interpreter,
        MemoryTransport, PollData, PollReply, ProtocolError, RaceStatus, RandomBits, ScriptedBits,
        SensorEvent, SerialTransport, StdioTransport, Transport,
    };
    pub use crate::session::{CancelToken, Session, SessionStats};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
