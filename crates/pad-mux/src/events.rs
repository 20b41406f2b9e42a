//! Events emitted by the voice multiplexer
//!
//! The allocator records channel changes and dropped notes in its event
//! buffer; the router forwards them, together with its own transfer failures
//! and state transitions, through a single channel so the status display sees
//! one consistently ordered stream.

use pad_protocol::{Note, NoteCommand};

use crate::channel::ChannelIndex;
use crate::state::RouterState;

/// Unified event enum for router and allocator activity
#[derive(Debug, Clone, PartialEq)]
pub enum RouterEvent {
    // -------------------------------------------------------------------------
    // Allocation events
    // -------------------------------------------------------------------------
    /// A channel was commanded to play a note or stop
    ChannelChanged {
        channel: ChannelIndex,
        command: NoteCommand,
    },

    /// Every channel was busy so a note was not played
    NoteDropped { source_channel: u8, note: Note },

    // -------------------------------------------------------------------------
    // Output events
    // -------------------------------------------------------------------------
    /// The driver could not deliver a command
    TransferFailed {
        channel: ChannelIndex,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Lifecycle events
    // -------------------------------------------------------------------------
    /// The router moved between lifecycle states
    StateChanged { from: RouterState, to: RouterState },
}

impl RouterEvent {
    /// Channel this event concerns, if any
    pub fn channel(&self) -> Option<ChannelIndex> {
        match self {
            RouterEvent::ChannelChanged { channel, .. }
            | RouterEvent::TransferFailed { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// Check if this event changes what the status display shows
    pub fn is_display_update(&self) -> bool {
        matches!(
            self,
            RouterEvent::ChannelChanged { .. } | RouterEvent::StateChanged { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_extraction() {
        let changed = RouterEvent::ChannelChanged {
            channel: ChannelIndex(1),
            command: NoteCommand::Stop,
        };
        assert_eq!(changed.channel(), Some(ChannelIndex(1)));
        assert!(changed.is_display_update());

        let failed = RouterEvent::TransferFailed {
            channel: ChannelIndex(2),
            message: "timeout".into(),
        };
        assert_eq!(failed.channel(), Some(ChannelIndex(2)));
        assert!(!failed.is_display_update());

        let state = RouterEvent::StateChanged {
            from: RouterState::Idle,
            to: RouterState::Streaming,
        };
        assert_eq!(state.channel(), None);
        assert!(state.is_display_update());
    }
}
