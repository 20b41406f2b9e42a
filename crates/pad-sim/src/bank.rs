//! A set of virtual controllers driven as physical channels

use std::collections::HashSet;

use pad_mux::{ChannelDriver, ChannelIndex, DriverError};
use pad_protocol::{NoteCommand, PulseCommand, PulseDuration};
use tracing::info;

use crate::controller::{PadState, VirtualController};

/// Virtual controllers standing in for claimed USB devices
///
/// Channels map onto controllers the same way they do for real hardware:
/// channel `i` is pad `i % 2` of controller `i / 2`.
#[derive(Debug)]
pub struct VirtualControllerBank {
    controllers: Vec<VirtualController>,
    failing: HashSet<ChannelIndex>,
}

impl VirtualControllerBank {
    /// Create `count` silent controllers
    pub fn new(count: usize) -> Self {
        info!("Simulating {} Steam Controller(s)", count);
        Self {
            controllers: (1..=count)
                .map(|n| VirtualController::new(format!("SIM{}", n)))
                .collect(),
            failing: HashSet::new(),
        }
    }

    /// Get the simulated controllers
    pub fn controllers(&self) -> &[VirtualController] {
        &self.controllers
    }

    /// State of the pad behind a channel
    pub fn pad_state(&self, channel: ChannelIndex) -> Option<&PadState> {
        self.controllers
            .get(channel.peripheral())
            .map(|c| c.pad(channel.pad()))
    }

    /// Whether any pad on any controller is vibrating
    pub fn any_sounding(&self) -> bool {
        self.controllers
            .iter()
            .flat_map(|c| [c.pad(pad_protocol::Pad::Right), c.pad(pad_protocol::Pad::Left)])
            .any(PadState::is_sounding)
    }

    /// Make every transfer to `channel` fail until [`heal`](Self::heal) is called
    pub fn fail_channel(&mut self, channel: ChannelIndex) {
        self.failing.insert(channel);
    }

    /// Let transfers to every channel succeed again
    pub fn heal(&mut self) {
        self.failing.clear();
    }
}

impl ChannelDriver for VirtualControllerBank {
    fn play_note(
        &mut self,
        channel: ChannelIndex,
        command: NoteCommand,
        duration: PulseDuration,
    ) -> Result<(), DriverError> {
        if self.failing.contains(&channel) {
            return Err(DriverError::Transfer {
                channel,
                reason: "simulated transfer failure".to_string(),
            });
        }
        let controller = self
            .controllers
            .get_mut(channel.peripheral())
            .ok_or(DriverError::NoDevice(channel))?;

        let report = PulseCommand::for_note(channel.pad(), command, duration).to_report();
        if controller.process_report(&report) {
            Ok(())
        } else {
            Err(DriverError::Transfer {
                channel,
                reason: format!("{} rejected the report", controller.id()),
            })
        }
    }
}
