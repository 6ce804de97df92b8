// SPDX-License-Identifier: MPL-2.0

//! PCI bus enumeration over the legacy configuration mechanism.
//!
//! [`PciScanner`] walks every (bus, device, function) triple through a
//! [`ConfigSpacePort`], probes each present function into a
//! [`PciDeviceRecord`] and collects the records in a [`DeviceDirectory`].
//! Secondary buses behind bridges are not walked.
//!
//! ```rust,ignore
//! let port = xk_frame::arch::pci::pio_config_space();
//! let directory = PciScanner::new(ScanConfig::default()).scan(port, &mut LogObserver);
//! if let Some(nic) = directory.find(0x8086, 0x100E) {
//!     let bar0 = nic.bar(0);
//! }
//! ```

pub mod bar;
pub mod cfg_space;
pub mod common_device;
pub mod device_info;
pub mod directory;
pub mod scan;
pub mod trace;

#[cfg(test)]
mod fake;

pub use self::{
    bar::{Bar, BarSlots, IoBar, MemoryBar, MemoryType},
    cfg_space::access::{ConfigSpaceGuard, ConfigSpacePort, PciConfigAccess, PciDeviceLocation},
    common_device::PciDeviceRecord,
    device_info::{HeaderLayout, PciDeviceId},
    directory::{DeviceDirectory, DEFAULT_CAPACITY},
    scan::{MultifunctionCheck, PciScanner, ScanConfig},
    trace::{LogObserver, NoopObserver, ScanObserver},
};
