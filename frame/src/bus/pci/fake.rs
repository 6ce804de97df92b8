// SPDX-License-Identifier: MPL-2.0

//! An in-memory configuration space for unit tests.

use alloc::{collections::BTreeMap, vec::Vec};

use super::cfg_space::{
    access::{ConfigSpacePort, PciConfigAccess, PciDeviceLocation, ABSENT},
    PciDeviceCfgSpace,
};

/// The registers of one function.
#[derive(Debug, Clone)]
pub(crate) struct FakeFunction {
    registers: [u32; PciDeviceCfgSpace::SIZE / 4],
    sizing_masks: [Option<u32>; PciDeviceCfgSpace::NUM_BARS],
}

impl FakeFunction {
    /// A standard device with decoding enabled and no BARs.
    pub(crate) fn device(vendor_id: u16, device_id: u16) -> Self {
        let mut function = Self {
            registers: [0; PciDeviceCfgSpace::SIZE / 4],
            sizing_masks: [None; PciDeviceCfgSpace::NUM_BARS],
        };
        function.registers[0] = ((device_id as u32) << 16) | vendor_id as u32;
        function.registers[1] = 0x0010_0007;
        function
    }

    pub(crate) fn header_type(mut self, header_type: u8) -> Self {
        self.registers[3] = (self.registers[3] & 0x00FF_FFFF) | ((header_type as u32) << 24);
        self
    }

    pub(crate) fn multifunction(mut self) -> Self {
        self.registers[3] |= 0x0080_0000;
        self
    }

    pub(crate) fn class(mut self, class_code: u8, subclass: u8, prog_if: u8, rev_id: u8) -> Self {
        self.registers[2] = u32::from_be_bytes([class_code, subclass, prog_if, rev_id]);
        self
    }

    pub(crate) fn interrupt(mut self, line: u8, pin: u8) -> Self {
        self.registers[15] = ((pin as u32) << 8) | line as u32;
        self
    }

    /// Sets BAR `index` to `raw` and the value it reads back after all ones
    /// are written to `sizing_mask`.
    pub(crate) fn set_bar(&mut self, index: usize, raw: u32, sizing_mask: u32) {
        self.registers[4 + index] = raw;
        self.sizing_masks[index] = Some(sizing_mask);
    }

    fn write(&mut self, offset: u8, value: u32) {
        let dword = offset as usize / 4;
        let bar = dword.checked_sub(4).filter(|&index| index < PciDeviceCfgSpace::NUM_BARS);
        self.registers[dword] = match bar {
            Some(index) if value == !0 => self.sizing_masks[index].unwrap_or(0),
            _ => value,
        };
    }
}

/// A bus of fake functions that logs every access.
#[derive(Debug, Default)]
pub(crate) struct FakeConfigSpace {
    functions: BTreeMap<PciDeviceLocation, FakeFunction>,
    writes: Vec<(PciDeviceLocation, u8, u32)>,
    reads: Vec<(PciDeviceLocation, u8)>,
}

impl FakeConfigSpace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_function(mut self, location: PciDeviceLocation, function: FakeFunction) -> Self {
        self.functions.insert(location, function);
        self
    }

    pub(crate) fn into_port(self) -> ConfigSpacePort<Self> {
        ConfigSpacePort::new(self)
    }

    /// The current value of a register, bypassing the access log.
    pub(crate) fn register(&self, location: &PciDeviceLocation, offset: u8) -> u32 {
        self.functions
            .get(location)
            .map_or(ABSENT, |function| function.registers[offset as usize / 4])
    }

    /// Every value written to one register, oldest first.
    pub(crate) fn writes_to(&self, location: &PciDeviceLocation, offset: u8) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(at, off, _)| at == location && *off == offset)
            .map(|&(_, _, value)| value)
            .collect()
    }

    /// Every write, oldest first.
    pub(crate) fn writes(&self) -> &[(PciDeviceLocation, u8, u32)] {
        &self.writes
    }

    /// Every read, oldest first.
    pub(crate) fn reads(&self) -> &[(PciDeviceLocation, u8)] {
        &self.reads
    }
}

impl PciConfigAccess for FakeConfigSpace {
    fn read32(&mut self, location: &PciDeviceLocation, offset: u8) -> u32 {
        self.reads.push((*location, offset));
        self.register(location, offset)
    }

    fn write32(&mut self, location: &PciDeviceLocation, offset: u8, value: u32) {
        self.writes.push((*location, offset, value));
        if let Some(function) = self.functions.get_mut(location) {
            function.write(offset, value);
        }
    }
}
