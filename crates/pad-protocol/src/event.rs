//! Normalized note event representation
//!
//! `NoteEvent` is what every event source (file playback, live input)
//! produces and what the voice allocator consumes.

/// Kind of a note event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteEventKind {
    /// Key pressed (velocity 0 means released)
    NoteOn,
    /// Key released
    NoteOff,
    /// The source has stopped; silence everything
    StopStream,
}

/// A note event from an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// What happened
    pub kind: NoteEventKind,
    /// Source (MIDI) channel
    pub channel: u8,
    /// Note number, ignored for `StopStream`
    pub note: u8,
    /// Velocity, 0 is treated as a release
    pub velocity: u8,
}

impl NoteEvent {
    /// Create a note-on event
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOn,
            channel,
            note,
            velocity,
        }
    }

    /// Create a note-off event
    pub fn note_off(channel: u8, note: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOff,
            channel,
            note,
            velocity: 0,
        }
    }

    /// Create a stop-stream event
    pub fn stop_stream() -> Self {
        Self {
            kind: NoteEventKind::StopStream,
            channel: 0,
            note: 0,
            velocity: 0,
        }
    }

    /// Returns true if this event starts a note
    pub fn is_press(&self) -> bool {
        self.kind == NoteEventKind::NoteOn && self.velocity > 0
    }

    /// Returns true if this event ends a note
    ///
    /// A note-on with velocity 0 counts as a release; several exporters
    /// write their note-offs that way.
    pub fn is_release(&self) -> bool {
        match self.kind {
            NoteEventKind::NoteOn => self.velocity == 0,
            NoteEventKind::NoteOff => true,
            NoteEventKind::StopStream => false,
        }
    }

    /// Returns true if this event terminates the stream
    pub fn is_stop_stream(&self) -> bool {
        self.kind == NoteEventKind::StopStream
    }
}
