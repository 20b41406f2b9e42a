//! Virtual controller simulation
//!
//! A simulated controller accepts the same 64-byte feature reports a real one
//! does and tracks what each pad is playing.

use pad_protocol::{Pad, PulseCommand};
use tracing::{debug, error};

/// What a single pad is doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadState {
    /// Last pulse received, if any
    pub pulse: Option<PulseCommand>,
}

impl PadState {
    /// Whether the pad is vibrating
    pub fn is_sounding(&self) -> bool {
        self.pulse.is_some_and(|p| !p.is_silent())
    }

    /// Approximate pulse frequency in Hz
    pub fn frequency(&self) -> Option<f64> {
        self.pulse.and_then(|p| p.frequency())
    }
}

/// A simulated Steam Controller
#[derive(Debug)]
pub struct VirtualController {
    /// Unique identifier for this controller
    id: String,
    /// Right pad state (wire value 0)
    right: PadState,
    /// Left pad state (wire value 1)
    left: PadState,
    /// Every report received, in order
    received_reports: Vec<Vec<u8>>,
}

impl VirtualController {
    /// Create a controller with both pads silent
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            right: PadState::default(),
            left: PadState::default(),
            received_reports: Vec::new(),
        }
    }

    /// Get the controller's identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// State of one pad
    pub fn pad(&self, pad: Pad) -> &PadState {
        match pad {
            Pad::Right => &self.right,
            Pad::Left => &self.left,
        }
    }

    /// Process a feature report sent to the controller
    ///
    /// Returns true if the report was a valid haptic pulse. Every report is
    /// stored for test verification, valid or not.
    pub fn process_report(&mut self, data: &[u8]) -> bool {
        self.received_reports.push(data.to_vec());

        match PulseCommand::decode(data) {
            Ok(pulse) => {
                match pulse.frequency() {
                    Some(hz) => debug!("{} {:?} pad: {:.1} Hz", self.id, pulse.pad, hz),
                    None => debug!("{} {:?} pad: off", self.id, pulse.pad),
                }
                let state = match pulse.pad {
                    Pad::Right => &mut self.right,
                    Pad::Left => &mut self.left,
                };
                state.pulse = Some(pulse);
                true
            }
            Err(e) => {
                error!("{} rejected report: {}", self.id, e);
                false
            }
        }
    }

    /// Get all received reports (for test verification)
    pub fn received_reports(&self) -> &[Vec<u8>] {
        &self.received_reports
    }

    /// Clear received reports
    pub fn clear_received(&mut self) {
        self.received_reports.clear();
    }
}
