//! Error types for MIDI event sources

use thiserror::Error;

/// Errors raised while opening an event source
#[derive(Debug, Error)]
pub enum MidiError {
    /// The file could not be read
    #[error("failed to read MIDI file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid Standard MIDI File
    #[error("MIDI parse error: {0}")]
    Parse(String),

    /// No MIDI input ports exist
    #[error("no MIDI input ports available")]
    NoInputPorts,

    /// The requested port does not exist
    #[error("MIDI input port '{name}' not found (available: {})", available.join(", "))]
    PortNotFound { name: String, available: Vec<String> },

    /// The MIDI backend failed
    #[error("MIDI device error: {0}")]
    Device(String),
}

impl From<midly::Error> for MidiError {
    fn from(e: midly::Error) -> Self {
        MidiError::Parse(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::Device(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::Device(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for MidiError {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        MidiError::Device(e.to_string())
    }
}
