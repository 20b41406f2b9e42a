//! USB controller scanner
//!
//! This module provides USB enumeration of haptic-capable controllers.

use rusb::{Device, GlobalContext};
use tracing::{debug, info};

use crate::error::DetectError;
use crate::usb_ids::{self, valve};

/// Information about a connected controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    /// USB bus number
    pub bus: u8,
    /// Device address on the bus
    pub address: u8,
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
}

impl ControllerInfo {
    /// Create from raw USB location and descriptor IDs
    pub fn new(bus: u8, address: u8, vid: u16, pid: u16) -> Self {
        Self {
            bus,
            address,
            vid,
            pid,
        }
    }

    /// Whether this device accepts haptic reports
    pub fn is_supported(&self) -> bool {
        usb_ids::is_supported_controller(self.vid, self.pid)
    }

    /// Display name, e.g. `"Steam Controller (wired)"`
    pub fn name(&self) -> &'static str {
        usb_ids::device_name(self.vid, self.pid).unwrap_or("Unknown device")
    }

    /// Location label used in logs, e.g. `"003:012"`
    pub fn location(&self) -> String {
        format!("{:03}:{:03}", self.bus, self.address)
    }
}

/// Controller scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Also report Valve devices that cannot be driven (e.g. the wireless receiver)
    pub include_unsupported: bool,
}

/// USB controller scanner
pub struct ControllerScanner {
    config: ScannerConfig,
}

impl ControllerScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate connected controllers
    pub fn enumerate_controllers(&self) -> Result<Vec<ControllerInfo>, DetectError> {
        Ok(self
            .enumerate_devices()?
            .into_iter()
            .map(|(_, info)| info)
            .collect())
    }

    /// Enumerate controllers along with their libusb device handles
    pub(crate) fn enumerate_devices(
        &self,
    ) -> Result<Vec<(Device<GlobalContext>, ControllerInfo)>, DetectError> {
        info!("Enumerating USB devices...");
        let devices = rusb::devices().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let mut result = Vec::new();
        for device in devices.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(d) => d,
                Err(e) => {
                    debug!(
                        "Skipping device {:03}:{:03}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    continue;
                }
            };

            let info = ControllerInfo::new(
                device.bus_number(),
                device.address(),
                descriptor.vendor_id(),
                descriptor.product_id(),
            );
            if self.should_include(&info) {
                result.push((device, info));
            }
        }

        if result.is_empty() {
            info!("No Steam Controllers found");
        } else {
            info!("Found {} Steam Controller(s)", result.len());
            for (_, c) in &result {
                info!("  {} - {}", c.location(), c.name());
            }
        }

        Ok(result)
    }

    /// Check if a device should be reported
    fn should_include(&self, info: &ControllerInfo) -> bool {
        if info.vid != valve::VID {
            return false;
        }
        info.is_supported() || self.config.include_unsupported
    }
}

impl Default for ControllerScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_info() {
        let info = ControllerInfo::new(3, 12, 0x28DE, 0x1102);

        assert!(info.is_supported());
        assert_eq!(info.name(), "Steam Controller (wired)");
        assert_eq!(info.location(), "003:012");
    }

    #[test]
    fn test_filtering() {
        let wired = ControllerInfo::new(1, 2, 0x28DE, 0x1102);
        let dongle = ControllerInfo::new(1, 3, 0x28DE, 0x1142);
        let other = ControllerInfo::new(1, 4, 0x0403, 0x6001);

        let scanner = ControllerScanner::new();
        assert!(scanner.should_include(&wired));
        assert!(!scanner.should_include(&dongle));
        assert!(!scanner.should_include(&other));

        let scanner = ControllerScanner::with_config(ScannerConfig {
            include_unsupported: true,
        });
        assert!(scanner.should_include(&dongle));
        assert!(!scanner.should_include(&other));
    }
}
