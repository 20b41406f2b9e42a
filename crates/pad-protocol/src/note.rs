//! Note numbers and the note frequency table
//!
//! Notes follow the 128-note MIDI scale. `NoteCommand` adds the `Stop`
//! sentinel used to silence a pad; it never indexes the frequency table.

use std::fmt;

use crate::error::ParseError;

/// Number of notes in the MIDI scale
pub const NOTE_COUNT: usize = 128;

/// Frequency in Hz of every MIDI note, indexed by note number
pub const NOTE_FREQUENCIES: [f64; NOTE_COUNT] = [
    8.1758, 8.66196, 9.17702, 9.72272, 10.3009, 10.9134, 11.5623, 12.2499, 12.9783, 13.75,
    14.5676, 15.4339, 16.3516, 17.3239, 18.354, 19.4454, 20.6017, 21.8268, 23.1247, 24.4997,
    25.9565, 27.5, 29.1352, 30.8677, 32.7032, 34.6478, 36.7081, 38.8909, 41.2034, 43.6535,
    46.2493, 48.9994, 51.9131, 55.0, 58.2705, 61.7354, 65.4064, 69.2957, 73.4162, 77.7817,
    82.4069, 87.3071, 92.4986, 97.9989, 103.826, 110.0, 116.541, 123.471, 130.813, 138.591,
    146.832, 155.563, 164.814, 174.614, 184.997, 195.998, 207.652, 220.0, 233.082, 246.942,
    261.626, 277.183, 293.665, 311.127, 329.628, 349.228, 369.994, 391.995, 415.305, 440.0,
    466.164, 493.883, 523.251, 554.365, 587.33, 622.254, 659.255, 698.456, 739.989, 783.991,
    830.609, 880.0, 932.328, 987.767, 1046.5, 1108.73, 1174.66, 1244.51, 1318.51, 1396.91,
    1479.98, 1567.98, 1661.22, 1760.0, 1864.66, 1975.53, 2093.0, 2217.46, 2349.32, 2489.02,
    2637.02, 2793.83, 2959.96, 3135.96, 3322.44, 3520.0, 3729.31, 3951.07, 4186.01, 4434.92,
    4698.64, 4978.03, 5274.04, 5587.65, 5919.91, 6271.93, 6644.88, 7040.0, 7458.62, 7902.13,
    8372.02, 8869.84, 9397.27, 9956.06, 10548.1, 11175.3, 11839.8, 12543.9,
];

const NOTE_NAMES: [&str; 12] = [
    " C", "C#", " D", "D#", " E", " F", "F#", " G", "G#", " A", "A#", " B",
];

/// A MIDI note number in `0..128`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Note(u8);

impl Note {
    /// Lowest note (C-1)
    pub const MIN: Note = Note(0);
    /// Highest note (G9)
    pub const MAX: Note = Note(127);

    /// Create a note, returning `None` outside the MIDI range
    pub const fn new(value: u8) -> Option<Self> {
        if (value as usize) < NOTE_COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Raw note number
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Frequency of this note in Hz
    pub fn frequency(self) -> f64 {
        NOTE_FREQUENCIES[self.0 as usize]
    }

    /// Duration of one oscillation in seconds
    pub fn period_secs(self) -> f64 {
        1.0 / self.frequency()
    }

    /// Scientific pitch name, e.g. `" C4"` or `"C#4"`
    ///
    /// Natural notes are padded to two characters so names line up in
    /// fixed-width output.
    pub fn name(self) -> String {
        let octave = (self.0 / 12) as i8 - 1;
        format!("{}{}", NOTE_NAMES[(self.0 % 12) as usize], octave)
    }

    /// Iterate every note from lowest to highest
    pub fn all() -> impl Iterator<Item = Note> {
        (0..NOTE_COUNT as u8).map(Note)
    }
}

impl TryFrom<u8> for Note {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Note::new(value).ok_or(ParseError::NoteOutOfRange(value))
    }
}

impl From<Note> for u8 {
    fn from(note: Note) -> Self {
        note.0
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_start())
    }
}

/// What a haptic channel should be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteCommand {
    /// Sound the given note until told otherwise
    Play(Note),
    /// Silence the channel
    #[default]
    Stop,
}

impl NoteCommand {
    /// The sounding note, if any
    pub fn note(&self) -> Option<Note> {
        match self {
            Self::Play(note) => Some(*note),
            Self::Stop => None,
        }
    }

    /// Whether this command silences the channel
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Label for status output: the note name, or `"OFF"`
    pub fn label(&self) -> String {
        match self {
            Self::Play(note) => note.name(),
            Self::Stop => "OFF".to_string(),
        }
    }
}

impl From<Note> for NoteCommand {
    fn from(note: Note) -> Self {
        Self::Play(note)
    }
}
