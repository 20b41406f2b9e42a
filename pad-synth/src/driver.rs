//! USB channel driver
//!
//! Routes each channel command to the claimed controller that owns the
//! channel's pad. Controllers are released when the driver is dropped.

use anyhow::{Context, Result};
use pad_detect::{claim_controllers, ClaimedController};
use pad_mux::{ChannelDriver, ChannelIndex, DriverError};
use pad_protocol::{NoteCommand, PulseCommand, PulseDuration};
use tracing::info;

pub struct UsbChannelDriver {
    controllers: Vec<ClaimedController>,
}

impl UsbChannelDriver {
    /// Claim `count` controllers
    pub fn claim(count: usize) -> Result<Self> {
        let controllers = claim_controllers(count).context("failed to claim Steam Controllers")?;
        for (n, controller) in controllers.iter().enumerate() {
            info!(
                "Controller {} = {} ({})",
                n + 1,
                controller.info().location(),
                if controller.is_claimed() { "claimed" } else { "unclaimed" }
            );
        }
        Ok(Self { controllers })
    }
}

impl ChannelDriver for UsbChannelDriver {
    fn play_note(
        &mut self,
        channel: ChannelIndex,
        command: NoteCommand,
        duration: PulseDuration,
    ) -> Result<(), DriverError> {
        let controller = self
            .controllers
            .get(channel.peripheral())
            .ok_or(DriverError::NoDevice(channel))?;

        let pulse = PulseCommand::for_note(channel.pad(), command, duration);
        controller
            .send_pulse(&pulse)
            .map_err(|e| DriverError::Transfer {
                channel,
                reason: e.to_string(),
            })
    }
}
