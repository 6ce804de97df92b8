// SPDX-License-Identifier: MPL-2.0

//! PCI bus access through the legacy `0xCF8`/`0xCFC` port pair.

use spin::Once;
use x86_64::instructions::port::{Port, PortWriteOnly};

use crate::bus::pci::cfg_space::access::{ConfigSpacePort, PciConfigAccess, PciDeviceLocation};

const PCI_ADDRESS_PORT: u16 = 0xCF8;
const PCI_DATA_PORT: u16 = 0xCFC;

/// Configuration mechanism #1: an address word selects the dword, the data
/// port transfers it.
pub struct PioConfigAccess {
    address_port: PortWriteOnly<u32>,
    data_port: Port<u32>,
}

impl PioConfigAccess {
    /// Creates the port pair.
    ///
    /// # Safety
    ///
    /// The caller must be the only owner of ports `0xCF8` and `0xCFC`.
    unsafe fn new() -> Self {
        Self {
            address_port: PortWriteOnly::new(PCI_ADDRESS_PORT),
            data_port: Port::new(PCI_DATA_PORT),
        }
    }
}

impl PciConfigAccess for PioConfigAccess {
    fn read32(&mut self, location: &PciDeviceLocation, offset: u8) -> u32 {
        // SAFETY: The port pair is exclusively owned through `PCI_PIO_CFG_SPACE`
        // and the address word always has the enable bit set.
        unsafe {
            self.address_port.write(location.config_address(offset));
            self.data_port.read()
        }
    }

    fn write32(&mut self, location: &PciDeviceLocation, offset: u8, value: u32) {
        // SAFETY: See `read32`.
        unsafe {
            self.address_port.write(location.config_address(offset));
            self.data_port.write(value);
        }
    }
}

static PCI_PIO_CFG_SPACE: Once<ConfigSpacePort<PioConfigAccess>> = Once::new();

/// Returns the machine-wide port-I/O configuration space.
pub fn pio_config_space() -> &'static ConfigSpacePort<PioConfigAccess> {
    PCI_PIO_CFG_SPACE.call_once(|| {
        // SAFETY: `call_once` creates the pair exactly once and nothing else
        // in the kernel touches these ports.
        ConfigSpacePort::new(unsafe { PioConfigAccess::new() })
    })
}
