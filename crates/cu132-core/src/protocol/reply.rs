//! Reply decoding
//!
//! Client-side view of the replies the control unit sends: splitting a framed
//! reply, checking its checksum, and unpacking version, race status and sensor
//! event payloads. Data fields are packed one nibble per byte.

use serde::{Deserialize, Serialize};

use super::{checksum, ProtocolError, CMD_TERMINATOR, MAX_REPLY_LEN};

/// First byte of a race status payload
pub const STATUS_MARKER: u8 = b':';

/// Split `<payload><checksum>$` and verify the checksum
///
/// Returns the payload without checksum and terminator.
pub fn split_reply(reply: &[u8]) -> Result<&[u8], ProtocolError> {
    let body = match reply.split_last() {
        Some((&CMD_TERMINATOR, body)) => body,
        _ => return Err(ProtocolError::MissingTerminator),
    };
    if reply.len() > MAX_REPLY_LEN {
        return Err(ProtocolError::ReplyTooLong {
            len: reply.len(),
            max: MAX_REPLY_LEN,
        });
    }

    let (actual, payload) = match body.split_last() {
        Some((&actual, payload)) if !payload.is_empty() => (actual, payload),
        _ => return Err(ProtocolError::ReplyTooShort(reply.len())),
    };

    let expected = checksum(payload);
    if expected != actual {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }
    Ok(payload)
}

/// Parse the firmware version from a version payload
///
/// Reads leading ASCII digits; a payload without any, or one that reads as
/// zero, is not a valid version.
pub fn parse_version(payload: &[u8]) -> Result<u32, ProtocolError> {
    let digits = payload.iter().take_while(|b| b.is_ascii_digit()).count();
    let text = String::from_utf8_lossy(&payload[..digits]);
    match text.parse::<u32>() {
        Ok(version) if version != 0 => Ok(version),
        _ => Err(ProtocolError::InvalidVersion(
            String::from_utf8_lossy(payload).into_owned(),
        )),
    }
}

fn nibble(payload: &[u8], index: usize) -> u8 {
    payload[index] & 0x0F
}

fn require_len(payload: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if payload.len() < expected {
        return Err(ProtocolError::PayloadTooShort {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Race status reported in response to a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceStatus {
    /// Fuel level per car slot (0-15)
    pub fuel_levels: [u8; 6],
    /// Start light stage
    pub start_light: u8,
    /// Fuel mode (0-3)
    pub fuel_mode: u8,
    /// Pit lane installed
    pub pit_lane: bool,
    /// Lap counter installed
    pub lap_counter: bool,
    /// Bit mask of cars currently in the pit
    pub cars_in_pit: u8,
}

impl RaceStatus {
    /// Minimum payload length
    pub const PAYLOAD_LEN: usize = 13;

    /// Decode a status payload (starting with `:`)
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        require_len(payload, Self::PAYLOAD_LEN)?;

        let mut fuel_levels = [0u8; 6];
        for (i, level) in fuel_levels.iter_mut().enumerate() {
            *level = nibble(payload, 1 + i);
        }
        let mode = payload[10];

        Ok(Self {
            fuel_levels,
            start_light: nibble(payload, 9),
            fuel_mode: mode & 0x03,
            pit_lane: mode & 0x04 != 0,
            lap_counter: mode & 0x08 != 0,
            cars_in_pit: nibble(payload, 11) | (nibble(payload, 12) << 4),
        })
    }
}

/// Lap sensor event reported in response to a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Car id
    pub id: u8,
    /// Event timestamp in unit ticks
    pub timestamp: u32,
    /// Sensor that fired
    pub sensor: u8,
}

impl SensorEvent {
    /// Minimum payload length
    pub const PAYLOAD_LEN: usize = 10;

    /// Payload index of each timestamp nibble, least significant first
    const TIMESTAMP_NIBBLES: [usize; 8] = [7, 8, 5, 6, 3, 4, 1, 2];

    /// Decode a sensor event payload
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        require_len(payload, Self::PAYLOAD_LEN)?;

        let timestamp = Self::TIMESTAMP_NIBBLES
            .iter()
            .enumerate()
            .fold(0u32, |acc, (shift, &index)| {
                acc | (u32::from(nibble(payload, index)) << (4 * shift))
            });

        Ok(Self {
            id: nibble(payload, 0),
            timestamp,
            sensor: nibble(payload, 9),
        })
    }
}

/// A decoded poll reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollData {
    /// Race status update
    Status(RaceStatus),
    /// Lap sensor event
    Sensor(SensorEvent),
}

impl PollData {
    /// Decode a poll payload, dispatching on the status marker
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        match payload.first() {
            Some(&STATUS_MARKER) => RaceStatus::decode(payload).map(PollData::Status),
            _ => SensorEvent::decode(payload).map(PollData::Sensor),
        }
    }
}
