// SPDX-License-Identifier: MPL-2.0

//! PCI bus
//!
//! [`pci_init`] enumerates the machine's PCI functions once during boot. Later
//! on, drivers look up their devices by identity or walk the list by index:
//!
//! ```rust,ignore
//! pci_init_from_cmdline(cmdline);
//! if let Some(nic) = pci_find(0x8086, 0x100E) {
//!     let irq = nic.int_line;
//!     let mmio = nic.bar(0);
//! }
//! let mut n = 0;
//! while let Some(device) = pci_get_nth(n) {
//!     n += 1;
//! }
//! ```
#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

use log::warn;
use spin::RwLock;
pub use xk_frame::bus::pci::{
    Bar, DeviceDirectory, MultifunctionCheck, PciDeviceId, PciDeviceLocation, PciDeviceRecord,
    ScanConfig,
};
use xk_frame::bus::pci::{ConfigSpacePort, LogObserver, PciConfigAccess, PciScanner};

/// The devices found by the last [`pci_init`].
static PCI_DIRECTORY: RwLock<DeviceDirectory> = RwLock::new(DeviceDirectory::empty());

/// Scans the PCI bus through the platform's configuration mechanism with the
/// default [`ScanConfig`].
///
/// Calling it again rescans and replaces the previous results.
pub fn pci_init() {
    pci_init_with_config(&ScanConfig::default());
}

/// Like [`pci_init`], with scan settings read from the kernel command line
/// (see [`ScanConfig::from_cmdline`]).
pub fn pci_init_from_cmdline(cmdline: &str) {
    pci_init_with_config(&ScanConfig::from_cmdline(cmdline));
}

fn pci_init_with_config(config: &ScanConfig) {
    if !xk_frame::arch::has_pci_pio() {
        warn!("PCI: no legacy configuration mechanism on this platform");
        *PCI_DIRECTORY.write() = DeviceDirectory::with_capacity(config.capacity);
        return;
    }
    #[cfg(target_arch = "x86_64")]
    pci_init_with(xk_frame::arch::pci::pio_config_space(), config);
}

/// Scans the PCI bus through `port` and replaces the previous results.
pub fn pci_init_with<A: PciConfigAccess>(port: &ConfigSpacePort<A>, config: &ScanConfig) {
    let directory = PciScanner::new(*config).scan(port, &mut LogObserver);
    *PCI_DIRECTORY.write() = directory;
}

/// Returns the `n`-th discovered function, counting from 0.
pub fn pci_get_nth(n: usize) -> Option<PciDeviceRecord> {
    PCI_DIRECTORY.read().get(n).copied()
}

/// Returns the first discovered function with this vendor and device ID.
pub fn pci_find(vendor_id: u16, device_id: u16) -> Option<PciDeviceRecord> {
    PCI_DIRECTORY.read().find(vendor_id, device_id).copied()
}

/// Number of discovered functions.
pub fn pci_device_count() -> usize {
    PCI_DIRECTORY.read().len()
}
