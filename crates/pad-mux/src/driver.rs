//! Channel driver interface
//!
//! The router hands every allocation decision to a [`ChannelDriver`], which
//! turns it into a pulse command for the right pad on the right controller.
//! Failures are per-transfer and never end the stream.

use pad_protocol::{NoteCommand, PulseDuration};
use thiserror::Error;

use crate::channel::ChannelIndex;

/// A failed delivery to a physical channel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// No controller backs this channel
    #[error("no controller for channel {0}")]
    NoDevice(ChannelIndex),

    /// The transfer itself failed
    #[error("transfer to {channel} failed: {reason}")]
    Transfer {
        channel: ChannelIndex,
        reason: String,
    },
}

/// Output side of the router
pub trait ChannelDriver {
    /// Play `command` on `channel`
    ///
    /// `PulseDuration::Indefinite` keeps the note sounding until the channel
    /// is told to stop. Must return before the next event is dispatched.
    fn play_note(
        &mut self,
        channel: ChannelIndex,
        command: NoteCommand,
        duration: PulseDuration,
    ) -> Result<(), DriverError>;
}

impl<D: ChannelDriver + ?Sized> ChannelDriver for Box<D> {
    fn play_note(
        &mut self,
        channel: ChannelIndex,
        command: NoteCommand,
        duration: PulseDuration,
    ) -> Result<(), DriverError> {
        (**self).play_note(channel, command, duration)
    }
}
