//! AIS message decoding.
//!
//! Turns NMEA 0183 `!AIVDM`/`!AIVDO` sentences into [`AisReport`]s: partial
//! vessel updates carrying only the fields a message type transmits.
//!
//! Supported message types:
//! - **1, 2, 3** Class A position report
//! - **5** Class A static and voyage data (usually two fragments)
//! - **18** Class B position report
//! - **19** Class B extended position report
//! - **24** Class B static data, parts A and B

mod nmea;
mod payload;

pub use nmea::NmeaDecoder;
pub use payload::decode_payload;

use thiserror::Error;

use crate::ship::Dimensions;

/// Turns one line of transport input into a vessel update.
///
/// Implementations may buffer state between calls (multi-fragment
/// messages), so decoding takes `&mut self`.
pub trait MessageDecoder: Send {
    /// Decode one line.
    ///
    /// Returns `Ok(None)` when the line was valid but did not complete a
    /// message (a leading fragment).
    fn decode(&mut self, line: &str) -> Result<Option<AisReport>, DecodeError>;
}

/// Fields decoded from one AIS message.
///
/// Everything but the message type and MMSI is optional: each message type
/// carries a different subset, and AIS marks unavailable values in-band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AisReport {
    pub msg_type: u8,
    pub mmsi: u32,
    pub nav_status: Option<u8>,
    /// Degrees per minute, signed (positive = starboard).
    pub turn_rate: Option<f64>,
    /// Knots.
    pub speed: Option<f64>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// Course over ground, degrees.
    pub course: Option<f64>,
    /// True heading, degrees.
    pub heading: Option<f64>,
    pub ais_version: Option<u8>,
    pub imo: Option<u32>,
    pub callsign: Option<String>,
    pub ship_name: Option<String>,
    pub ship_type: Option<u16>,
    pub dimensions: Dimensions,
    pub destination: Option<String>,
}

impl AisReport {
    pub fn new(msg_type: u8, mmsi: u32) -> Self {
        Self {
            msg_type,
            mmsi,
            ..Default::default()
        }
    }

    pub fn has_position(&self) -> bool {
        self.lon.is_some() && self.lat.is_some()
    }
}

/// Errors decoding a single sentence. All are recoverable: the caller drops
/// the sentence and carries on with the next one.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Line is not a well-formed VDM/VDO sentence.
    #[error("Malformed sentence: {0}")]
    Framing(String),

    /// Checksum does not match the sentence body.
    #[error("Checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },

    /// Payload contains a character outside the 6-bit armoring alphabet.
    #[error("Invalid payload character {0:?}")]
    Armor(char),

    /// Message type this decoder does not handle.
    #[error("Unsupported message type {0}")]
    UnsupportedType(u8),

    /// Payload ends before a field the message type requires.
    #[error("Payload too short: need {needed} bits, have {available}")]
    Truncated { needed: usize, available: usize },

    /// A fragment arrived without the fragments that precede it.
    #[error("Fragment {number} of {count} arrived out of sequence")]
    FragmentSequence { number: u8, count: u8 },
}
