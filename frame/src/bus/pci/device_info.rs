// SPDX-License-Identifier: MPL-2.0

//! PCI device Information

use bit_field::BitField;

/// PCI device ID
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PciDeviceId {
    /// Vendor ID
    pub vendor_id: u16,
    /// Device ID
    pub device_id: u16,
}

impl PciDeviceId {
    /// Splits the dword at offset 0x00.
    pub fn from_dword(dword: u32) -> Self {
        Self {
            vendor_id: dword.get_bits(0..16) as u16,
            device_id: dword.get_bits(16..32) as u16,
        }
    }
}

/// The register layout selected by bits 6:0 of the header type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderLayout {
    /// A standard device with six BARs.
    Device,
    /// A PCI-to-PCI bridge.
    Bridge,
    /// Any other layout, e.g. a CardBus bridge. Left undecoded.
    Unknown(u8),
}

impl HeaderLayout {
    /// Decodes the layout from a raw header type byte.
    pub fn from_header_type(header_type: u8) -> Self {
        match header_type.get_bits(0..7) {
            0x00 => Self::Device,
            0x01 => Self::Bridge,
            other => Self::Unknown(other),
        }
    }
}

/// Whether bit 7 of a raw header type byte marks a multifunction device.
pub fn is_multifunction(header_type: u8) -> bool {
    header_type.get_bit(7)
}
