//! Control Unit Serial Protocol
//!
//! Implements the responder side of the CU132 request/response protocol.
//!
//! A request is the prefix byte `"` followed by a command byte. The unit
//! acknowledges by echoing the command, then answers with either a
//! checksummed reply (`<payload><checksum>$`) or the bare `#` for anything it
//! does not understand.

pub mod checksum;
pub mod commands;
mod error;
mod framer;
mod interpreter;
pub mod reply;
pub mod serial;
mod status;
pub mod stream;

pub use checksum::{checksum, frame, verify};
pub use commands::{Command, PollReply};
pub use error::ProtocolError;
pub use framer::Framer;
pub use interpreter::{Exchange, Interpreter};
pub use reply::{parse_version, split_reply, PollData, RaceStatus, SensorEvent};
pub use serial::{list_ports, open_port, PortInfo};
pub use status::{BitSource, RandomBits, ScriptedBits};
pub use stream::{MemoryTransport, SerialTransport, StdioTransport, Transport};

/// Default baud rate of the control unit link
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Default serial read timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Default sleep between empty transport reads in milliseconds
pub const DEFAULT_IDLE_POLL_MS: u64 = 5;

/// Marks the start of a command (`"`)
pub const CMD_PREFIX: u8 = 0x22;

/// Terminates a checksummed reply (`$`)
pub const CMD_TERMINATOR: u8 = 0x24;

/// Reply for an unrecognized prefix or command (`#`)
pub const UNKNOWN_REPLY: u8 = 0x23;

/// Largest reply the client buffers, checksum and terminator included
pub const MAX_REPLY_LEN: usize = 18;

/// Tracing target for mirrored wire traffic
pub const WIRE_TARGET: &str = "cu132::wire";
