//! Conversion from MIDI messages to note events

use midly::live::LiveEvent;
use midly::num::u4;
use midly::MidiMessage;
use pad_protocol::NoteEvent;

/// Convert a channel message, keeping only note-on and note-off
///
/// Velocity-zero note-ons are passed through unchanged; the allocator
/// treats them as releases.
pub fn note_event(channel: u4, message: &MidiMessage) -> Option<NoteEvent> {
    let channel = channel.as_int();
    match *message {
        MidiMessage::NoteOn { key, vel } => Some(NoteEvent::note_on(channel, key.as_int(), vel.as_int())),
        MidiMessage::NoteOff { key, .. } => Some(NoteEvent::note_off(channel, key.as_int())),
        _ => None,
    }
}

/// Decode one raw message as delivered by a live input port
pub fn decode_live(bytes: &[u8]) -> Option<NoteEvent> {
    match LiveEvent::parse(bytes).ok()? {
        LiveEvent::Midi { channel, message } => note_event(channel, &message),
        _ => None,
    }
}
