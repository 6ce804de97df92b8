// SPDX-License-Identifier: MPL-2.0

//! Fallback for platforms without port I/O.

pub mod serial;

/// Whether the platform has the port-I/O configuration mechanism.
pub fn has_pci_pio() -> bool {
    false
}
