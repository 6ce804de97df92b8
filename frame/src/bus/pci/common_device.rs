// SPDX-License-Identifier: MPL-2.0

//! Probing one PCI function into a [`PciDeviceRecord`].

use bit_field::BitField;

use super::{
    bar::{self, Bar, BarSlots},
    cfg_space::{
        access::{ConfigSpaceGuard, PciConfigAccess, PciDeviceLocation},
        PciDeviceCfgSpace,
    },
    device_info::{self, HeaderLayout, PciDeviceId},
};

/// Everything the scan learns about one PCI function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceRecord {
    /// Where the function was found.
    pub location: PciDeviceLocation,
    /// Vendor ID
    pub vendor_id: u16,
    /// Device ID
    pub device_id: u16,
    /// Header type. Bit 7 is the multifunction flag.
    pub header_type: u8,
    /// Specifies the type of function the device performs.
    pub class_code: u8,
    /// Specifies the specific function the device performs.
    pub subclass: u8,
    /// Programming Interface Byte
    pub prog_if: u8,
    /// Revision ID
    pub rev_id: u8,
    /// Legacy interrupt pin. Standard devices only.
    pub int_pin: u8,
    /// Legacy interrupt line. Standard devices only.
    pub int_line: u8,
    /// BAR slots. Standard devices only; all zero otherwise.
    pub bars: BarSlots,
}

impl PciDeviceRecord {
    /// A zeroed record for `location`.
    pub fn new(location: PciDeviceLocation) -> Self {
        Self {
            location,
            vendor_id: 0,
            device_id: 0,
            header_type: 0,
            class_code: 0,
            subclass: 0,
            prog_if: 0,
            rev_id: 0,
            int_pin: 0,
            int_line: 0,
            bars: BarSlots::default(),
        }
    }

    /// The vendor/device identity pair.
    pub fn id(&self) -> PciDeviceId {
        PciDeviceId {
            vendor_id: self.vendor_id,
            device_id: self.device_id,
        }
    }

    /// The register layout named by the header type.
    pub fn layout(&self) -> HeaderLayout {
        HeaderLayout::from_header_type(self.header_type)
    }

    /// Whether the device implements functions other than 0.
    pub fn is_multifunction(&self) -> bool {
        device_info::is_multifunction(self.header_type)
    }

    /// Typed view of the BAR starting at slot `index`.
    pub fn bar(&self, index: usize) -> Option<Bar> {
        self.bars.bar(index)
    }
}

/// Reads the identity, class and, for standard devices, the BARs and
/// interrupt routing of the function at `location`.
///
/// The caller has already checked that the function is present. Decoding is
/// turned off in the command register while the BARs are sized and restored
/// afterwards.
pub fn probe<A: PciConfigAccess>(
    cfg: &mut ConfigSpaceGuard<'_, A>,
    location: &PciDeviceLocation,
) -> PciDeviceRecord {
    let mut record = PciDeviceRecord::new(*location);

    let id = PciDeviceId::from_dword(cfg.read32(location, PciDeviceCfgSpace::VENDOR_ID));
    record.vendor_id = id.vendor_id;
    record.device_id = id.device_id;

    let class = cfg.read32(location, PciDeviceCfgSpace::REVISION_ID);
    record.class_code = class.get_bits(24..32) as u8;
    record.subclass = class.get_bits(16..24) as u8;
    record.prog_if = class.get_bits(8..16) as u8;
    record.rev_id = class.get_bits(0..8) as u8;

    let header = cfg.read32(location, PciDeviceCfgSpace::CACHE_LINE_SIZE);
    record.header_type = header.get_bits(24..32) as u8;

    // Bridges and other layouts keep only identity and class; secondary buses
    // are not walked.
    if record.layout() == HeaderLayout::Device {
        let command = cfg.read32(location, PciDeviceCfgSpace::COMMAND);
        // Disconnect from the bus while the BARs hold all ones.
        cfg.write32(location, PciDeviceCfgSpace::COMMAND, 0);
        record.bars = bar::decode_bars(cfg, location);
        cfg.write32(location, PciDeviceCfgSpace::COMMAND, command);

        let interrupt = cfg.read32(location, PciDeviceCfgSpace::INTERRUPT_LINE);
        record.int_line = interrupt.get_bits(0..8) as u8;
        record.int_pin = interrupt.get_bits(8..16) as u8;
    }

    record
}
