//! Standard MIDI File loading
//!
//! Files are parsed with `midly`, every track is merged into one list ordered
//! by absolute tick, and ticks are converted to wall-clock offsets using the
//! file's own tempo map. Only note-on and note-off messages are kept.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use midly::{MetaMessage, Smf, Timing, TrackEventKind};
use pad_protocol::NoteEvent;
use tracing::{debug, info};

use crate::convert::note_event;
use crate::error::MidiError;

/// Tempo used until the first tempo meta event (120 BPM)
pub const DEFAULT_TEMPO_MICROS: u32 = 500_000;

/// A note event with its offset from the start of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedNoteEvent {
    pub offset: Duration,
    pub event: NoteEvent,
}

/// A parsed MIDI file ready for playback
#[derive(Debug, Clone)]
pub struct MidiFile {
    events: Vec<TimedNoteEvent>,
    track_count: usize,
}

/// Merged track content before timing is applied
enum Entry {
    Tempo(u32),
    Note(NoteEvent),
}

impl MidiFile {
    /// Load and parse a MIDI file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MidiError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file = Self::parse(&data)?;
        info!(
            "Loaded {}: {} track(s), {} note event(s), {:.1}s",
            path.display(),
            file.track_count,
            file.events.len(),
            file.duration().as_secs_f64()
        );
        Ok(file)
    }

    /// Parse a MIDI file from bytes
    pub fn parse(data: &[u8]) -> Result<Self, MidiError> {
        let smf = Smf::parse(data)?;

        let mut entries: Vec<(u64, Entry)> = Vec::new();
        for track in &smf.tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;
                match &event.kind {
                    TrackEventKind::Midi { channel, message } => {
                        if let Some(note) = note_event(*channel, message) {
                            entries.push((tick, Entry::Note(note)));
                        }
                    }
                    TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                        entries.push((tick, Entry::Tempo(tempo.as_int())));
                    }
                    _ => {}
                }
            }
        }
        // Stable: simultaneous events keep track order
        entries.sort_by_key(|(tick, _)| *tick);

        let events = match smf.header.timing {
            Timing::Metrical(ticks_per_beat) => {
                debug!("Metrical timing, {} ticks per beat", ticks_per_beat.as_int());
                apply_tempo_map(entries, ticks_per_beat.as_int().max(1) as u64)
            }
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = fps.as_f32() as f64 * subframes.max(1) as f64;
                debug!("Timecode timing, {} ticks per second", ticks_per_second);
                entries
                    .into_iter()
                    .filter_map(|(tick, entry)| match entry {
                        Entry::Note(event) => Some(TimedNoteEvent {
                            offset: Duration::from_secs_f64(tick as f64 / ticks_per_second),
                            event,
                        }),
                        Entry::Tempo(_) => None,
                    })
                    .collect()
            }
        };

        Ok(Self {
            events,
            track_count: smf.tracks.len(),
        })
    }

    /// Note events in playback order
    pub fn events(&self) -> &[TimedNoteEvent] {
        &self.events
    }

    /// Consume the file, keeping its events
    pub fn into_events(self) -> Vec<TimedNoteEvent> {
        self.events
    }

    /// Number of tracks in the file
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// Number of note events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offset of the last event
    pub fn duration(&self) -> Duration {
        self.events.last().map(|e| e.offset).unwrap_or_default()
    }

    /// Highest source channel that carries notes
    pub fn highest_channel(&self) -> Option<u8> {
        self.events.iter().map(|e| e.event.channel).max()
    }

    /// Largest number of notes held at the same time
    pub fn peak_polyphony(&self) -> usize {
        let mut held = HashSet::new();
        let mut peak = 0;
        for TimedNoteEvent { event, .. } in &self.events {
            if event.is_press() {
                held.insert((event.channel, event.note));
                peak = peak.max(held.len());
            } else if event.is_release() {
                held.remove(&(event.channel, event.note));
            }
        }
        peak
    }
}

/// Convert ticks to offsets, honouring every tempo change
///
/// Arithmetic is done in `u128` and offsets saturate at `u64::MAX`
/// microseconds, so arbitrarily long files cannot overflow.
fn apply_tempo_map(entries: Vec<(u64, Entry)>, ticks_per_beat: u64) -> Vec<TimedNoteEvent> {
    let mut tempo = DEFAULT_TEMPO_MICROS as u128;
    let mut base_tick = 0u64;
    let mut base_micros = 0u128;
    let mut events = Vec::with_capacity(entries.len());

    for (tick, entry) in entries {
        let elapsed = (tick - base_tick) as u128 * tempo / ticks_per_beat as u128;
        let micros = base_micros.saturating_add(elapsed);
        match entry {
            Entry::Tempo(new_tempo) => {
                base_tick = tick;
                base_micros = micros;
                tempo = new_tempo as u128;
            }
            Entry::Note(event) => events.push(TimedNoteEvent {
                offset: Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX)),
                event,
            }),
        }
    }
    events
}
