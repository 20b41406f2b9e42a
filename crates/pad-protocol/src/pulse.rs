//! Haptic pulse command encoding
//!
//! A Steam Controller plays a tone on one of its trackpad actuators when it
//! receives a 64-byte feature report describing a square pulse train.
//!
//! # Format
//!
//! ```text
//! byte 0      0x8F  report id
//! byte 1      0x07  haptic pulse command
//! byte 2      pad   0x00 = right, 0x01 = left
//! byte 3..5   u16   pulse high duration (LE)
//! byte 5..7   u16   pulse low duration (LE)
//! byte 7..9   u16   repeat count (LE)
//! byte 9..64        zero padding
//! ```
//!
//! Durations are expressed in controller ticks; one second of period is
//! [`PERIOD_RATIO`] ticks.

use std::time::Duration;

use crate::error::ParseError;
use crate::note::{Note, NoteCommand};
use crate::EncodeCommand;

/// Size of a feature report
pub const REPORT_LEN: usize = 64;

/// Report id of the haptic feature report
pub const REPORT_ID: u8 = 0x8F;

/// Command byte for a haptic pulse train
pub const HAPTIC_PULSE: u8 = 0x07;

/// Controller ticks per second of pulse period
pub const PERIOD_RATIO: f64 = 495_483.0;

/// Repeat count meaning "keep pulsing until told otherwise"
pub const REPEAT_INDEFINITE: u16 = 0x7FFF;

/// Haptic actuator on a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pad {
    /// Right trackpad (wire value 0)
    Right,
    /// Left trackpad (wire value 1)
    Left,
}

impl Pad {
    /// Pad for a channel's position within its controller (`index % 2`)
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            Pad::Right
        } else {
            Pad::Left
        }
    }

    /// Wire value
    pub fn as_u8(&self) -> u8 {
        match self {
            Pad::Right => 0x00,
            Pad::Left => 0x01,
        }
    }

    /// Parse a wire value
    pub fn from_u8(value: u8) -> Result<Self, ParseError> {
        match value {
            0x00 => Ok(Pad::Right),
            0x01 => Ok(Pad::Left),
            other => Err(ParseError::InvalidPad(other)),
        }
    }

    /// One-letter label
    pub fn short_name(&self) -> &'static str {
        match self {
            Pad::Right => "R",
            Pad::Left => "L",
        }
    }
}

/// How long a note should sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseDuration {
    /// Sound until explicitly stopped
    #[default]
    Indefinite,
    /// Sound for a fixed time
    Finite(Duration),
}

/// A decoded haptic pulse command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCommand {
    /// Target actuator
    pub pad: Pad,
    /// High half of the pulse, in controller ticks
    pub high_ticks: u16,
    /// Low half of the pulse, in controller ticks
    pub low_ticks: u16,
    /// Number of pulses; 0 silences the pad
    pub repeat_count: u16,
}

impl PulseCommand {
    /// Build the pulse train for a note command
    ///
    /// `Stop` is encoded as a zero-length train using the lowest note's
    /// period; it never consults the frequency table for another note.
    pub fn for_note(pad: Pad, command: NoteCommand, duration: PulseDuration) -> Self {
        let (note, duration) = match command.note() {
            Some(note) => (note, duration),
            None => (Note::MIN, PulseDuration::Finite(Duration::ZERO)),
        };

        let ticks = period_ticks(note);
        let repeat_count = match duration {
            PulseDuration::Indefinite => REPEAT_INDEFINITE,
            PulseDuration::Finite(d) => {
                let pulses = d.as_secs_f64() * note.frequency();
                pulses.min(REPEAT_INDEFINITE as f64) as u16
            }
        };

        Self {
            pad,
            high_ticks: ticks,
            low_ticks: ticks,
            repeat_count,
        }
    }

    /// Whether this command silences the pad
    pub fn is_silent(&self) -> bool {
        self.repeat_count == 0
    }

    /// Approximate frequency of the pulse train in Hz
    pub fn frequency(&self) -> Option<f64> {
        let ticks = self.high_ticks.max(1) as f64;
        (!self.is_silent()).then(|| PERIOD_RATIO / ticks)
    }

    /// Decode a feature report
    pub fn decode(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() != REPORT_LEN {
            return Err(ParseError::InvalidLength {
                expected: REPORT_LEN,
                actual: data.len(),
            });
        }
        if data[0] != REPORT_ID || data[1] != HAPTIC_PULSE {
            return Err(ParseError::InvalidHeader(data[0], data[1]));
        }

        Ok(Self {
            pad: Pad::from_u8(data[2])?,
            high_ticks: u16::from_le_bytes([data[3], data[4]]),
            low_ticks: u16::from_le_bytes([data[5], data[6]]),
            repeat_count: u16::from_le_bytes([data[7], data[8]]),
        })
    }

    /// Encode into a fixed-size feature report
    pub fn to_report(&self) -> [u8; REPORT_LEN] {
        let mut report = [0u8; REPORT_LEN];
        report[0] = REPORT_ID;
        report[1] = HAPTIC_PULSE;
        report[2] = self.pad.as_u8();
        report[3..5].copy_from_slice(&self.high_ticks.to_le_bytes());
        report[5..7].copy_from_slice(&self.low_ticks.to_le_bytes());
        report[7..9].copy_from_slice(&self.repeat_count.to_le_bytes());
        report
    }
}

impl EncodeCommand for PulseCommand {
    fn encode(&self) -> Vec<u8> {
        self.to_report().to_vec()
    }
}

/// Period of a note in controller ticks
fn period_ticks(note: Note) -> u16 {
    let ticks = note.period_secs() * PERIOD_RATIO;
    ticks.min(u16::MAX as f64) as u16
}
