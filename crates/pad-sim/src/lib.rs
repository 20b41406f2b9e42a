//! Haptic Pad Simulation Library
//!
//! This crate provides virtual Steam Controllers for running and testing the
//! voice multiplexer without hardware. It includes:
//!
//! - **VirtualController**: decodes haptic feature reports and tracks what
//!   each pad is playing
//! - **VirtualControllerBank**: a set of controllers implementing
//!   [`ChannelDriver`](pad_mux::ChannelDriver), with failure injection
//!
//! # Example
//!
//! ```rust
//! use pad_mux::{ChannelDriver, ChannelIndex};
//! use pad_protocol::{Note, NoteCommand, PulseDuration};
//! use pad_sim::VirtualControllerBank;
//!
//! let mut bank = VirtualControllerBank::new(1);
//! let a4 = NoteCommand::Play(Note::new(69).unwrap());
//! bank.play_note(ChannelIndex(0), a4, PulseDuration::Indefinite).unwrap();
//!
//! assert!(bank.any_sounding());
//! ```

pub mod bank;
pub mod controller;

pub use bank::VirtualControllerBank;
pub use controller::{PadState, VirtualController};
