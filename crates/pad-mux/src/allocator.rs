//! Voice allocator
//!
//! Maps note events onto the fixed pool of physical channels. The allocator
//! owns all note state; callers get back the commands to issue and can drain
//! the events describing what changed.
//!
//! # Policies
//!
//! - **Single voice**: source channel `c` drives physical channel `c`. Every
//!   note-on overwrites whatever the channel was playing; source channels
//!   beyond the last pad are ignored.
//! - **Polyphony**: a note-on takes the lowest-numbered free slot and keeps it
//!   until the matching note-off for the same `(source_channel, note)` pair.
//!   When every slot is taken the note is dropped. Nothing is ever stolen.
//!
//! Bookkeeping reflects intent: state is updated when a command is decided,
//! whether or not the driver later manages to deliver it.

use std::collections::VecDeque;

use pad_protocol::{Note, NoteCommand, NoteEvent, NoteEventKind};
use tracing::{debug, info};

use crate::channel::{ChannelIndex, ChannelLayout};
use crate::events::RouterEvent;
use crate::state::{AllocationPolicy, VoiceBinding};

/// Undrained events kept before the oldest are discarded
pub const MAX_BUFFERED_EVENTS: usize = 1024;

/// A decision to put one channel into a new state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCommand {
    pub channel: ChannelIndex,
    pub command: NoteCommand,
}

impl ChannelCommand {
    pub fn new(channel: ChannelIndex, command: NoteCommand) -> Self {
        Self { channel, command }
    }

    /// Shorthand for a stop command
    pub fn stop(channel: ChannelIndex) -> Self {
        Self::new(channel, NoteCommand::Stop)
    }
}

/// The voice allocation engine
pub struct VoiceAllocator {
    policy: AllocationPolicy,
    layout: ChannelLayout,
    /// Polyphony bindings, one per physical channel
    slots: Vec<Option<VoiceBinding>>,
    /// Single-voice state, one per physical channel
    last_notes: Vec<NoteCommand>,
    /// Undrained events, oldest first, at most `MAX_BUFFERED_EVENTS`
    event_buffer: VecDeque<RouterEvent>,
}

impl VoiceAllocator {
    /// Create an allocator with every channel silent
    pub fn new(policy: AllocationPolicy, layout: ChannelLayout) -> Self {
        let total = layout.total_channels();
        info!(
            "Voice allocator: {} over {} channel(s) on {} controller(s)",
            policy,
            total,
            layout.controller_count()
        );

        Self {
            policy,
            layout,
            slots: vec![None; total],
            last_notes: vec![NoteCommand::Stop; total],
            event_buffer: VecDeque::new(),
        }
    }

    /// The policy fixed at construction
    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// The channel layout fixed at construction
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    /// Handle one event, returning the commands to issue in order
    ///
    /// A `StopStream` event is answered with a full stop-all.
    pub fn handle(&mut self, event: &NoteEvent) -> Vec<ChannelCommand> {
        if event.kind == NoteEventKind::StopStream {
            return self.stop_all();
        }

        let Some(note) = Note::new(event.note) else {
            debug!("Ignoring event with invalid note {}", event.note);
            return Vec::new();
        };

        match self.policy {
            AllocationPolicy::SingleVoice => self.single_voice(event, note),
            AllocationPolicy::Polyphony => self.polyphony(event, note),
        }
    }

    /// Silence every channel and forget every binding
    pub fn stop_all(&mut self) -> Vec<ChannelCommand> {
        info!("Stopping all {} channel(s)", self.layout.total_channels());

        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.last_notes.iter_mut().for_each(|last| *last = NoteCommand::Stop);

        let channels: Vec<ChannelIndex> = self.layout.channels().collect();
        channels
            .into_iter()
            .map(|channel| self.command(channel, NoteCommand::Stop))
            .collect()
    }

    // =========================================================================
    // Policies
    // =========================================================================

    fn single_voice(&mut self, event: &NoteEvent, note: Note) -> Vec<ChannelCommand> {
        let Some(channel) = self.layout.channel(event.channel) else {
            debug!(
                "Source channel {} has no pad ({} available), ignoring",
                event.channel,
                self.layout.total_channels()
            );
            return Vec::new();
        };

        let command = if event.is_press() {
            NoteCommand::Play(note)
        } else {
            NoteCommand::Stop
        };
        self.last_notes[channel.as_usize()] = command;

        vec![self.command(channel, command)]
    }

    fn polyphony(&mut self, event: &NoteEvent, note: Note) -> Vec<ChannelCommand> {
        let binding = VoiceBinding::new(event.channel, note);

        if event.is_release() {
            let Some(index) = self.find_binding(&binding) else {
                debug!("No voice bound to ch {} note {}, ignoring release", event.channel, note);
                return Vec::new();
            };
            self.slots[index] = None;
            return vec![self.command(ChannelIndex(index), NoteCommand::Stop)];
        }

        // A pair is never bound twice; a repeated press re-triggers its slot
        if let Some(index) = self.find_binding(&binding) {
            debug!("Re-triggering ch {} note {} on slot {}", event.channel, note, index);
            return vec![self.command(ChannelIndex(index), NoteCommand::Play(note))];
        }

        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(binding);
                vec![self.command(ChannelIndex(index), NoteCommand::Play(note))]
            }
            None => {
                debug!(
                    "All {} voices busy, dropping ch {} note {}",
                    self.slots.len(),
                    event.channel,
                    note
                );
                self.record(RouterEvent::NoteDropped {
                    source_channel: event.channel,
                    note,
                });
                Vec::new()
            }
        }
    }

    fn find_binding(&self, binding: &VoiceBinding) -> Option<usize> {
        self.slots.iter().position(|slot| slot.as_ref() == Some(binding))
    }

    fn command(&mut self, channel: ChannelIndex, command: NoteCommand) -> ChannelCommand {
        self.record(RouterEvent::ChannelChanged { channel, command });
        ChannelCommand::new(channel, command)
    }

    fn record(&mut self, event: RouterEvent) {
        if self.event_buffer.len() == MAX_BUFFERED_EVENTS {
            self.event_buffer.pop_front();
        }
        self.event_buffer.push_back(event);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Binding held by a channel's polyphony slot
    pub fn slot(&self, channel: ChannelIndex) -> Option<VoiceBinding> {
        self.slots.get(channel.as_usize()).copied().flatten()
    }

    /// Most recent single-voice command for a channel
    pub fn last_note(&self, channel: ChannelIndex) -> Option<NoteCommand> {
        self.last_notes.get(channel.as_usize()).copied()
    }

    /// Number of channels currently sounding
    pub fn active_voices(&self) -> usize {
        self.channel_states()
            .iter()
            .filter(|command| !command.is_stop())
            .count()
    }

    /// What each channel is playing, in channel order
    pub fn channel_states(&self) -> Vec<NoteCommand> {
        match self.policy {
            AllocationPolicy::SingleVoice => self.last_notes.clone(),
            AllocationPolicy::Polyphony => self
                .slots
                .iter()
                .map(|slot| match slot {
                    Some(binding) => NoteCommand::Play(binding.note),
                    None => NoteCommand::Stop,
                })
                .collect(),
        }
    }

    /// Take the events recorded since the last drain
    ///
    /// Callers driving the allocator directly should drain after each
    /// [`handle`](Self::handle); only the newest `MAX_BUFFERED_EVENTS` are
    /// kept otherwise.
    pub fn drain_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.event_buffer).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(n: u8) -> Note {
        Note::new(n).unwrap()
    }

    fn allocator(policy: AllocationPolicy, controllers: usize) -> VoiceAllocator {
        VoiceAllocator::new(policy, ChannelLayout::new(controllers).unwrap())
    }

    fn play(channel: usize, n: u8) -> ChannelCommand {
        ChannelCommand::new(ChannelIndex(channel), NoteCommand::Play(note(n)))
    }

    fn stop(channel: usize) -> ChannelCommand {
        ChannelCommand::stop(ChannelIndex(channel))
    }

    // =========================================================================
    // Single voice
    // =========================================================================

    #[test]
    fn test_single_voice_maps_channel_directly() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);

        assert_eq!(alloc.handle(&NoteEvent::note_on(1, 60, 100)), vec![play(1, 60)]);
        assert_eq!(alloc.last_note(ChannelIndex(1)), Some(NoteCommand::Play(note(60))));
        assert_eq!(alloc.last_note(ChannelIndex(0)), Some(NoteCommand::Stop));
    }

    #[test]
    fn test_single_voice_latest_note_wins() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);

        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        let commands = alloc.handle(&NoteEvent::note_on(0, 67, 100));

        assert_eq!(commands, vec![play(0, 67)]);
        assert_eq!(alloc.last_note(ChannelIndex(0)), Some(NoteCommand::Play(note(67))));
        assert_eq!(alloc.active_voices(), 1);
    }

    #[test]
    fn test_single_voice_zero_velocity_is_release() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));

        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 60, 0)), vec![stop(0)]);
        assert_eq!(alloc.last_note(ChannelIndex(0)), Some(NoteCommand::Stop));

        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        assert_eq!(alloc.handle(&NoteEvent::note_off(0, 60)), vec![stop(0)]);
    }

    #[test]
    fn test_single_voice_release_stops_whatever_is_sounding() {
        // The release is for the channel, not for a particular note
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        alloc.handle(&NoteEvent::note_on(0, 64, 100));

        assert_eq!(alloc.handle(&NoteEvent::note_off(0, 60)), vec![stop(0)]);
        assert_eq!(alloc.active_voices(), 0);
    }

    #[test]
    fn test_single_voice_out_of_range_channel_ignored() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);

        assert!(alloc.handle(&NoteEvent::note_on(2, 60, 100)).is_empty());
        assert!(alloc.handle(&NoteEvent::note_off(9, 60)).is_empty());
        assert!(alloc.drain_events().is_empty());
        assert_eq!(alloc.active_voices(), 0);
    }

    // =========================================================================
    // Polyphony
    // =========================================================================

    #[test]
    fn test_polyphony_two_controller_scenario() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 2);

        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 60, 100)), vec![play(0, 60)]);
        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 64, 100)), vec![play(1, 64)]);
        assert_eq!(alloc.handle(&NoteEvent::note_off(0, 60)), vec![stop(0)]);

        assert_eq!(alloc.slot(ChannelIndex(0)), None);
        assert_eq!(alloc.slot(ChannelIndex(1)), Some(VoiceBinding::new(0, note(64))));
    }

    #[test]
    fn test_polyphony_ignores_source_channel_for_placement() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 1);

        assert_eq!(alloc.handle(&NoteEvent::note_on(9, 60, 100)), vec![play(0, 60)]);
        assert_eq!(alloc.handle(&NoteEvent::note_on(15, 60, 100)), vec![play(1, 60)]);

        // Same note, different source channel: distinct bindings
        assert_eq!(alloc.handle(&NoteEvent::note_off(15, 60)), vec![stop(1)]);
        assert_eq!(alloc.slot(ChannelIndex(0)), Some(VoiceBinding::new(9, note(60))));
    }

    #[test]
    fn test_polyphony_drops_when_full() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        alloc.handle(&NoteEvent::note_on(0, 62, 100));
        alloc.drain_events();

        assert!(alloc.handle(&NoteEvent::note_on(0, 64, 100)).is_empty());
        assert_eq!(
            alloc.drain_events(),
            vec![RouterEvent::NoteDropped {
                source_channel: 0,
                note: note(64)
            }]
        );

        // The dropped note's release is a no-op
        assert!(alloc.handle(&NoteEvent::note_off(0, 64)).is_empty());
        assert_eq!(alloc.active_voices(), 2);
    }

    #[test]
    fn test_polyphony_reuses_lowest_free_slot() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 2);
        for n in [60, 62, 64, 65] {
            alloc.handle(&NoteEvent::note_on(0, n, 100));
        }

        alloc.handle(&NoteEvent::note_off(0, 64));
        alloc.handle(&NoteEvent::note_off(0, 62));

        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 62, 100)), vec![play(1, 62)]);
        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 71, 100)), vec![play(2, 71)]);
    }

    #[test]
    fn test_polyphony_spurious_release_is_noop() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));

        assert!(alloc.handle(&NoteEvent::note_off(0, 61)).is_empty());
        assert!(alloc.handle(&NoteEvent::note_off(1, 60)).is_empty());
        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 60, 0)), vec![stop(0)]);
        assert!(alloc.handle(&NoteEvent::note_off(0, 60)).is_empty());
    }

    #[test]
    fn test_polyphony_repeated_press_retriggers() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));

        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 60, 90)), vec![play(0, 60)]);
        assert_eq!(alloc.slot(ChannelIndex(1)), None);

        // A single release frees it
        assert_eq!(alloc.handle(&NoteEvent::note_off(0, 60)), vec![stop(0)]);
        assert_eq!(alloc.active_voices(), 0);
    }

    // =========================================================================
    // Stop all and events
    // =========================================================================

    #[test]
    fn test_stop_all_silences_every_channel() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 2);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        alloc.handle(&NoteEvent::note_on(0, 64, 100));

        let commands = alloc.stop_all();
        assert_eq!(commands, vec![stop(0), stop(1), stop(2), stop(3)]);
        assert_eq!(alloc.active_voices(), 0);
        assert!(alloc.channel_states().iter().all(NoteCommand::is_stop));

        // Freed slots are reusable from the bottom
        assert_eq!(alloc.handle(&NoteEvent::note_on(0, 67, 100)), vec![play(0, 67)]);
    }

    #[test]
    fn test_stop_stream_event_stops_all() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);
        alloc.handle(&NoteEvent::note_on(1, 60, 100));

        assert_eq!(alloc.handle(&NoteEvent::stop_stream()), vec![stop(0), stop(1)]);
        assert_eq!(alloc.last_note(ChannelIndex(1)), Some(NoteCommand::Stop));
    }

    #[test]
    fn test_invalid_note_ignored() {
        let mut alloc = allocator(AllocationPolicy::Polyphony, 1);
        assert!(alloc.handle(&NoteEvent::note_on(0, 128, 100)).is_empty());
        assert_eq!(alloc.active_voices(), 0);
    }

    #[test]
    fn test_events_mirror_commands() {
        let mut alloc = allocator(AllocationPolicy::SingleVoice, 1);
        alloc.handle(&NoteEvent::note_on(0, 60, 100));
        alloc.handle(&NoteEvent::note_off(0, 60));

        let events = alloc.drain_events();
        assert_eq!(
            events,
            vec![
                RouterEvent::ChannelChanged {
                    channel: ChannelIndex(0),
                    command: NoteCommand::Play(note(60)),
                },
                RouterEvent::ChannelChanged {
                    channel: ChannelIndex(0),
                    command: NoteCommand::Stop,
                },
            ]
        );
        assert!(alloc.drain_events().is_empty());
    }

    #[test]
    fn test_undrained_events_are_bounded() {
        let mut alloc = VoiceAllocator::new(AllocationPolicy::SingleVoice, ChannelLayout::default());

        for _ in 0..MAX_BUFFERED_EVENTS {
            alloc.handle(&NoteEvent::note_on(0, 60, 100));
        }
        alloc.handle(&NoteEvent::note_off(0, 60));

        let events = alloc.drain_events();
        assert_eq!(events.len(), MAX_BUFFERED_EVENTS);
        // The oldest event made room for the newest
        assert_eq!(
            events.last(),
            Some(&RouterEvent::ChannelChanged {
                channel: ChannelIndex(0),
                command: NoteCommand::Stop,
            })
        );
        assert!(alloc.drain_events().is_empty());
    }
}
