//! Error types for controller detection

use thiserror::Error;

/// Errors that can occur while finding or talking to controllers
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate USB devices
    #[error("failed to enumerate USB devices: {0}")]
    EnumerationFailed(String),

    /// Fewer controllers connected than requested
    #[error("requested {requested} wired Steam Controller(s) but found {found}")]
    NotEnoughControllers { requested: usize, found: usize },

    /// Failed to open a device
    #[error("failed to open controller {device}: {reason}")]
    OpenFailed { device: String, reason: String },

    /// A feature report transfer failed
    #[error("transfer to controller {device} failed: {reason}")]
    TransferFailed { device: String, reason: String },

    /// Transfer wrote fewer bytes than the report holds
    #[error("short transfer to controller {device}: wrote {written} of {expected} bytes")]
    ShortTransfer {
        device: String,
        written: usize,
        expected: usize,
    },

    /// Underlying libusb error
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
}
