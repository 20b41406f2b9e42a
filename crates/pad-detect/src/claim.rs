//! Claiming controllers for exclusive haptic output
//!
//! A [`ClaimedController`] owns an open libusb handle with the haptic
//! interface claimed. The interface is released and the device reset when
//! the value is dropped, so every exit path (normal shutdown, a fatal error
//! after only some controllers were claimed, a panic) hands the hardware
//! back to the OS.

use std::time::Duration;

use pad_protocol::{PulseCommand, REPORT_LEN};
use rusb::{Device, DeviceHandle, GlobalContext};
use tracing::{debug, info, trace, warn};

use crate::error::DetectError;
use crate::scanner::{ControllerInfo, ControllerScanner};
use crate::usb_ids::{hid, valve};

/// Timeout for a single feature report transfer
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

/// A controller with its haptic interface claimed
pub struct ClaimedController {
    info: ControllerInfo,
    handle: DeviceHandle<GlobalContext>,
    claimed: bool,
}

impl ClaimedController {
    /// Open a device and claim its haptic interface
    ///
    /// Failing to claim the interface is logged but not fatal: some platforms
    /// still accept class requests on an unclaimed interface, and if they do
    /// not, each transfer reports its own error.
    pub fn claim(device: Device<GlobalContext>, info: ControllerInfo) -> Result<Self, DetectError> {
        let mut handle = device.open().map_err(|e| DetectError::OpenFailed {
            device: info.location(),
            reason: e.to_string(),
        })?;

        // Not supported on every platform
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Auto-detach unavailable for {}: {}", info.location(), e);
        }

        let claimed = match handle.claim_interface(valve::HAPTIC_INTERFACE) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Unable to claim interface {} on {}: {}",
                    valve::HAPTIC_INTERFACE,
                    info.location(),
                    e
                );
                false
            }
        };

        info!("Claimed {} at {}", info.name(), info.location());
        Ok(Self {
            info,
            handle,
            claimed,
        })
    }

    /// Device information
    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    /// Whether the haptic interface was claimed
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Send a raw feature report to the haptic interface
    pub fn send_report(&self, report: &[u8]) -> Result<(), DetectError> {
        trace!("Sending report to {}: {:02X?}", self.info.location(), &report[..report.len().min(9)]);

        let written = self
            .handle
            .write_control(
                hid::REQUEST_TYPE_OUT,
                hid::SET_REPORT,
                hid::FEATURE_REPORT_VALUE,
                valve::HAPTIC_INTERFACE as u16,
                report,
                TRANSFER_TIMEOUT,
            )
            .map_err(|e| DetectError::TransferFailed {
                device: self.info.location(),
                reason: e.to_string(),
            })?;

        if written != report.len() {
            return Err(DetectError::ShortTransfer {
                device: self.info.location(),
                written,
                expected: report.len(),
            });
        }
        Ok(())
    }

    /// Encode and send a pulse command
    pub fn send_pulse(&self, pulse: &PulseCommand) -> Result<(), DetectError> {
        let report: [u8; REPORT_LEN] = pulse.to_report();
        self.send_report(&report)
    }
}

impl Drop for ClaimedController {
    fn drop(&mut self) {
        if self.claimed {
            if let Err(e) = self.handle.release_interface(valve::HAPTIC_INTERFACE) {
                warn!("Failed to release {}: {}", self.info.location(), e);
            }
        }
        if let Err(e) = self.handle.reset() {
            debug!("Reset of {} failed: {}", self.info.location(), e);
        }
        info!("Released {} at {}", self.info.name(), self.info.location());
    }
}

impl std::fmt::Debug for ClaimedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimedController")
            .field("info", &self.info)
            .field("claimed", &self.claimed)
            .field("handle", &"<libusb handle>")
            .finish()
    }
}

/// Find and claim `count` distinct wired controllers
///
/// Controllers are taken in enumeration order. If fewer than `count` are
/// connected nothing is claimed and `NotEnoughControllers` is returned; if
/// opening one fails, the ones already claimed are released on return.
pub fn claim_controllers(count: usize) -> Result<Vec<ClaimedController>, DetectError> {
    let devices: Vec<_> = ControllerScanner::new()
        .enumerate_devices()?
        .into_iter()
        .filter(|(_, info)| info.is_supported())
        .collect();

    if devices.len() < count {
        return Err(DetectError::NotEnoughControllers {
            requested: count,
            found: devices.len(),
        });
    }

    devices
        .into_iter()
        .take(count)
        .map(|(device, info)| ClaimedController::claim(device, info))
        .collect()
}
