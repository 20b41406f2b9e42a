//! Physical channel addressing
//!
//! Every controller exposes two pads. Channel `i` lives on controller
//! `i / 2`; its pad is `i % 2`, index 0 being the right pad (wire value 0).
//! The layout is fixed when the allocator is built and never resized.

use std::fmt;

use pad_protocol::Pad;
use serde::{Deserialize, Serialize};

use crate::error::MuxError;

/// Number of haptic pads on each controller
pub const CHANNELS_PER_CONTROLLER: usize = 2;

/// Index of one physical haptic pad across all controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelIndex(pub usize);

impl ChannelIndex {
    /// Get the raw index
    pub fn as_usize(&self) -> usize {
        self.0
    }

    /// Controller this channel belongs to (0-based)
    pub fn peripheral(&self) -> usize {
        self.0 / CHANNELS_PER_CONTROLLER
    }

    /// Pad on the controller
    pub fn pad(&self) -> Pad {
        Pad::from_index(self.0)
    }

    /// Short label such as `"R1"` or `"L2"` (controllers numbered from 1)
    pub fn label(&self) -> String {
        format!("{}{}", self.pad().short_name(), self.peripheral() + 1)
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The fixed set of physical channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLayout {
    controller_count: usize,
}

impl ChannelLayout {
    /// Layout for `controller_count` controllers
    pub fn new(controller_count: usize) -> Result<Self, MuxError> {
        if controller_count == 0 {
            return Err(MuxError::NoControllers);
        }
        Ok(Self { controller_count })
    }

    /// Number of controllers
    pub fn controller_count(&self) -> usize {
        self.controller_count
    }

    /// Number of physical channels (two per controller)
    pub fn total_channels(&self) -> usize {
        self.controller_count * CHANNELS_PER_CONTROLLER
    }

    /// Map a source channel number onto a physical channel, if in range
    pub fn channel(&self, source: u8) -> Option<ChannelIndex> {
        let index = source as usize;
        (index < self.total_channels()).then_some(ChannelIndex(index))
    }

    /// Iterate over every physical channel in index order
    pub fn channels(&self) -> impl Iterator<Item = ChannelIndex> {
        (0..self.total_channels()).map(ChannelIndex)
    }
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self { controller_count: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_addressing() {
        let ch = ChannelIndex(0);
        assert_eq!(ch.peripheral(), 0);
        assert_eq!(ch.pad(), Pad::Right);
        assert_eq!(ch.label(), "R1");

        let ch = ChannelIndex(3);
        assert_eq!(ch.peripheral(), 1);
        assert_eq!(ch.pad(), Pad::Left);
        assert_eq!(ch.to_string(), "L2");
    }

    #[test]
    fn test_layout_bounds() {
        let layout = ChannelLayout::new(2).unwrap();
        assert_eq!(layout.total_channels(), 4);
        assert_eq!(layout.channel(3), Some(ChannelIndex(3)));
        assert_eq!(layout.channel(4), None);
        assert_eq!(layout.channels().count(), 4);

        let single = ChannelLayout::default();
        assert_eq!(single.total_channels(), 2);
        assert_eq!(single.channel(2), None);
    }

    #[test]
    fn test_zero_controllers_rejected() {
        assert_eq!(ChannelLayout::new(0), Err(MuxError::NoControllers));
    }
}
