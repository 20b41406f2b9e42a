//! Haptic Voice Multiplexer
//!
//! This crate maps a stream of note events onto the haptic pads of one or
//! more Steam Controllers. Each controller contributes two physical channels
//! (its right and left pads), so `N` controllers give a fixed pool of `2N`
//! voices.
//!
//! # Architecture
//!
//! - [`VoiceAllocator`] owns all note state and decides, for each event,
//!   which channels to command. It implements two policies:
//!   - **Single voice**: source channel `c` plays on pad `c`, latest note wins
//!   - **Polyphony**: each note takes the lowest free pad until released
//! - [`EventRouter`] pulls events from a tokio channel, dispatches them one at
//!   a time, hands the resulting commands to a [`ChannelDriver`], and silences
//!   every pad exactly once when the stream ends or is cancelled.
//! - All observable activity (channel changes, dropped notes, failed
//!   transfers, state transitions) is published as [`RouterEvent`]s.
//!
//! # Example
//!
//! ```rust
//! use pad_mux::{AllocationPolicy, ChannelIndex, ChannelLayout, VoiceAllocator};
//! use pad_protocol::{NoteCommand, NoteEvent};
//!
//! let layout = ChannelLayout::new(2).unwrap();
//! let mut alloc = VoiceAllocator::new(AllocationPolicy::Polyphony, layout);
//!
//! alloc.handle(&NoteEvent::note_on(0, 60, 100));
//! let cmds = alloc.handle(&NoteEvent::note_on(0, 64, 100));
//! assert_eq!(cmds[0].channel, ChannelIndex(1));
//!
//! let cmds = alloc.handle(&NoteEvent::note_off(0, 60));
//! assert_eq!(cmds[0].command, NoteCommand::Stop);
//! ```

pub mod allocator;
pub mod channel;
pub mod driver;
pub mod error;
pub mod events;
pub mod router;
pub mod state;

pub use allocator::{ChannelCommand, VoiceAllocator, MAX_BUFFERED_EVENTS};
pub use channel::{ChannelIndex, ChannelLayout, CHANNELS_PER_CONTROLLER};
pub use driver::{ChannelDriver, DriverError};
pub use error::MuxError;
pub use events::RouterEvent;
pub use router::{EventRouter, RouterSummary, TerminationReason};
pub use state::{AllocationPolicy, RouterState, VoiceBinding};
