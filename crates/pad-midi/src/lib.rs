//! MIDI Event Sources
//!
//! This crate turns MIDI into the [`NoteEvent`](pad_protocol::NoteEvent)
//! stream the router consumes:
//!
//! - **Files**: [`MidiFile`] parses a Standard MIDI File and converts its
//!   tempo map into wall-clock offsets; [`spawn_playback`] replays it onto a
//!   tokio channel and closes the channel at the end.
//! - **Live input** (`midi-io` feature): [`LiveInput`] forwards note messages
//!   from a MIDI input port.
//!
//! # Example
//!
//! ```rust,no_run
//! use pad_midi::{spawn_playback, MidiFile};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), pad_midi::MidiError> {
//! let file = MidiFile::load("song.mid")?;
//! let (tx, mut rx) = mpsc::channel(256);
//! spawn_playback(file, tx);
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod file;
#[cfg(feature = "midi-io")]
pub mod live;
pub mod player;

pub use convert::decode_live;
pub use error::MidiError;
pub use file::{MidiFile, TimedNoteEvent, DEFAULT_TEMPO_MICROS};
#[cfg(feature = "midi-io")]
pub use live::{input_port_names, LiveInput};
pub use player::{play_events, spawn_playback};
