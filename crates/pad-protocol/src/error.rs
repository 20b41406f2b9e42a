//! Error types for note and pulse packet handling

use thiserror::Error;

/// Errors that can occur while parsing notes or pulse reports
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Note number outside the MIDI range
    #[error("note {0} is outside the MIDI range 0-127")]
    NoteOutOfRange(u8),

    /// Report has the wrong size
    #[error("invalid report length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Report id / command byte mismatch
    #[error("invalid report header: 0x{0:02X} 0x{1:02X}")]
    InvalidHeader(u8, u8),

    /// Unknown pad selector
    #[error("invalid pad selector: 0x{0:02X}")]
    InvalidPad(u8),
}
