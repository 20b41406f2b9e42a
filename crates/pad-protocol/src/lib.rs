//! Haptic Pad Protocol Library
//!
//! This crate provides the shared vocabulary for driving Steam Controller
//! trackpad actuators as tone generators:
//!
//! - **Notes**: MIDI note numbers with a precomputed frequency table, plus
//!   the `Stop` sentinel that silences a pad
//! - **Note events**: the normalized note-on / note-off / stop-stream events
//!   every event source produces
//! - **Pulse commands**: the 64-byte haptic feature report that makes a pad
//!   vibrate at a note's frequency
//!
//! # Example
//!
//! ```rust
//! use pad_protocol::{EncodeCommand, Note, NoteCommand, Pad, PulseCommand, PulseDuration};
//!
//! let a4 = Note::new(69).unwrap();
//! let cmd = PulseCommand::for_note(Pad::Right, NoteCommand::Play(a4), PulseDuration::Indefinite);
//!
//! let report = cmd.encode();
//! assert_eq!(report.len(), 64);
//! assert_eq!(report[0], 0x8F);
//! ```

pub mod error;
pub mod event;
pub mod note;
pub mod pulse;

pub use error::ParseError;
pub use event::{NoteEvent, NoteEventKind};
pub use note::{Note, NoteCommand, NOTE_COUNT, NOTE_FREQUENCIES};
pub use pulse::{Pad, PulseCommand, PulseDuration, REPORT_LEN};

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
