//! Steam Controller Detection Library
//!
//! This crate provides USB enumeration of wired Steam Controllers and
//! scoped claiming of their haptic interface.
//!
//! # Example
//!
//! ```rust,no_run
//! use pad_detect::{claim_controllers, ControllerScanner};
//!
//! let scanner = ControllerScanner::new();
//! for controller in scanner.enumerate_controllers().unwrap() {
//!     println!("Found {} at {}", controller.name(), controller.location());
//! }
//!
//! // Interfaces are released when `claimed` goes out of scope
//! let claimed = claim_controllers(1).unwrap();
//! assert_eq!(claimed.len(), 1);
//! ```

pub mod claim;
pub mod error;
pub mod scanner;
pub mod usb_ids;

pub use claim::{claim_controllers, ClaimedController, TRANSFER_TIMEOUT};
pub use error::DetectError;
pub use scanner::{ControllerInfo, ControllerScanner, ScannerConfig};
