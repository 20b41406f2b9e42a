//! USB Vendor/Product ID database for supported haptic peripherals
//!
//! Only the wired Steam Controller exposes its haptic feature report on a
//! claimable interface; the wireless receiver and later hardware revisions
//! are recognized for display purposes only.

/// USB Vendor ID / Product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }
}

/// Valve Corporation
pub mod valve {
    use super::UsbId;

    pub const VID: u16 = 0x28DE;

    /// Steam Controller, wired over USB
    pub const STEAM_CONTROLLER_WIRED: UsbId = UsbId::new(VID, 0x1102);
    /// Steam Controller wireless receiver
    pub const STEAM_CONTROLLER_DONGLE: UsbId = UsbId::new(VID, 0x1142);

    /// Interface that accepts haptic feature reports on a wired controller
    pub const HAPTIC_INTERFACE: u8 = 2;
}

/// HID class request used to deliver a feature report
pub mod hid {
    /// Host-to-device, class request, interface recipient
    pub const REQUEST_TYPE_OUT: u8 = 0x21;
    /// SET_REPORT
    pub const SET_REPORT: u8 = 0x09;
    /// Report type 3 (feature), report id 0
    pub const FEATURE_REPORT_VALUE: u16 = 0x0300;
}

/// Check if a VID/PID can be driven as a haptic peripheral
pub fn is_supported_controller(vid: u16, pid: u16) -> bool {
    UsbId::new(vid, pid) == valve::STEAM_CONTROLLER_WIRED
}

/// Human-readable name for a known Valve device
pub fn device_name(vid: u16, pid: u16) -> Option<&'static str> {
    match UsbId::new(vid, pid) {
        valve::STEAM_CONTROLLER_WIRED => Some("Steam Controller (wired)"),
        valve::STEAM_CONTROLLER_DONGLE => Some("Steam Controller wireless receiver"),
        _ => None,
    }
}
