//! Error types for the voice multiplexer

use thiserror::Error;

/// Configuration errors raised before any streaming starts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MuxError {
    /// Policy name not recognized
    #[error("unknown allocation policy '{0}' (expected single_voice or polyphony)")]
    UnknownPolicy(String),

    /// A channel layout needs at least one controller
    #[error("at least one controller is required")]
    NoControllers,
}
