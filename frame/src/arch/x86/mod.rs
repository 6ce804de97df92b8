// SPDX-License-Identifier: MPL-2.0

//! Platform-specific code for the x86-64 platform.

pub mod pci;
pub mod serial;

/// Whether the platform has the port-I/O configuration mechanism.
pub fn has_pci_pio() -> bool {
    true
}
