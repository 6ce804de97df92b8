// SPDX-License-Identifier: MPL-2.0

//! Base Address Register (BAR) sizing and decoding.
//!
//! A BAR is sized by writing all ones to it and reading back the address
//! bits the device hardwires to zero. The sizing state must not be visible
//! on the bus, so callers disable decoding in the command register first
//! (see [`super::common_device::probe`]).

use bit_field::BitField;

use super::cfg_space::{
    access::{ConfigSpaceGuard, PciConfigAccess, PciDeviceLocation},
    PciDeviceCfgSpace,
};

const IO_BASE_MASK: u32 = 0xFFFC;
const IO_SIZE_MASK: u32 = 0xFFFF;
const MEMORY_BASE_MASK: u32 = 0xFFFF_FFF0;

/// The six BAR slots of a standard device, as parallel arrays.
///
/// A 64-bit BAR in slot `i` leaves slot `i + 1` with the raw upper address
/// dword in `base`, and zero `size` and `kind`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BarSlots {
    /// Decoded base address, or the upper dword of a 64-bit BAR.
    pub base: [u32; PciDeviceCfgSpace::NUM_BARS],
    /// Region length in bytes. `0` for a continuation slot, and for a memory
    /// BAR whose sizing mask reads back as zero (a 4 GiB wrap).
    pub size: [u32; PciDeviceCfgSpace::NUM_BARS],
    /// The low four bits of the operational BAR value.
    pub kind: [u8; PciDeviceCfgSpace::NUM_BARS],
}

/// The result of decoding one BAR register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBar {
    /// Base address with the flag bits stripped.
    pub base: u32,
    /// Region length.
    pub size: u32,
    /// The low four bits of the operational value.
    pub kind: u8,
}

impl DecodedBar {
    /// Whether this is a memory BAR whose address continues in the next slot.
    pub fn is_64bit(&self) -> bool {
        is_64bit_kind(self.kind)
    }
}

/// Decodes one BAR from its operational value and the mask read back after
/// writing all ones.
pub fn decode_bar(raw: u32, sizing_mask: u32) -> DecodedBar {
    let kind = raw.get_bits(0..4) as u8;
    if raw.get_bit(0) {
        DecodedBar {
            base: raw & IO_BASE_MASK,
            size: (!(sizing_mask & IO_BASE_MASK) & IO_SIZE_MASK) + 1,
            kind,
        }
    } else {
        DecodedBar {
            base: raw & MEMORY_BASE_MASK,
            size: (!(sizing_mask & MEMORY_BASE_MASK)).wrapping_add(1),
            kind,
        }
    }
}

fn is_64bit_kind(kind: u8) -> bool {
    !kind.get_bit(0) && MemoryType::from_kind(kind) == MemoryType::Bits64
}

/// Runs the sizing probe on one BAR register.
///
/// Returns the operational value and the sizing mask. The operational value
/// is written back before returning.
pub fn size_bar<A: PciConfigAccess>(
    cfg: &mut ConfigSpaceGuard<'_, A>,
    location: &PciDeviceLocation,
    index: usize,
) -> (u32, u32) {
    let offset = PciDeviceCfgSpace::bar_offset(index);
    let raw = cfg.read32(location, offset);
    cfg.write32(location, offset, !0);
    let sizing_mask = cfg.read32(location, offset);
    cfg.write32(location, offset, raw);
    (raw, sizing_mask)
}

/// Sizes and decodes all six BARs of a standard device.
///
/// Decoding must be bracketed by disabling and restoring the command
/// register; this function does not touch it.
pub fn decode_bars<A: PciConfigAccess>(
    cfg: &mut ConfigSpaceGuard<'_, A>,
    location: &PciDeviceLocation,
) -> BarSlots {
    let mut slots = BarSlots::default();
    let mut index = 0;
    while index < PciDeviceCfgSpace::NUM_BARS {
        let (raw, sizing_mask) = size_bar(cfg, location, index);
        let bar = decode_bar(raw, sizing_mask);
        slots.base[index] = bar.base;
        slots.size[index] = bar.size;
        slots.kind[index] = bar.kind;
        if bar.is_64bit() && index + 1 < PciDeviceCfgSpace::NUM_BARS {
            index += 1;
            slots.base[index] = cfg.read32(location, PciDeviceCfgSpace::bar_offset(index));
        }
        index += 1;
    }
    slots
}

impl BarSlots {
    /// Returns a typed view of the BAR that starts at `index`.
    ///
    /// Returns `None` for out-of-range indices, for unpopulated slots (zero
    /// base, both dwords for a 64-bit BAR) and for the upper half of a 64-bit
    /// BAR.
    pub fn bar(&self, index: usize) -> Option<Bar> {
        if index >= PciDeviceCfgSpace::NUM_BARS || self.is_continuation(index) {
            return None;
        }
        let kind = self.kind[index];
        let size = self.size[index];
        if kind.get_bit(0) {
            let base = self.base[index];
            return (base != 0).then_some(Bar::Io(IoBar { base, size }));
        }
        let memory_type = MemoryType::from_kind(kind);
        let mut base = self.base[index] as u64;
        if memory_type == MemoryType::Bits64 && index + 1 < PciDeviceCfgSpace::NUM_BARS {
            base |= (self.base[index + 1] as u64) << 32;
        }
        // A 64-bit BAR may sit on a 4 GiB boundary with a zero low dword.
        if base == 0 {
            return None;
        }
        Some(Bar::Memory(MemoryBar {
            base,
            size,
            prefetchable: kind.get_bit(3),
            memory_type,
        }))
    }

    /// Iterates over the populated BARs as `(slot, bar)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Bar)> + '_ {
        (0..PciDeviceCfgSpace::NUM_BARS).filter_map(|index| Some((index, self.bar(index)?)))
    }

    /// Whether slot `index` holds the upper dword of the BAR before it.
    pub fn is_continuation(&self, index: usize) -> bool {
        index > 0 && index < PciDeviceCfgSpace::NUM_BARS && is_64bit_kind(self.kind[index - 1])
    }
}

/// BAR space in PCI common config space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bar {
    /// Memory BAR
    Memory(MemoryBar),
    /// I/O BAR
    Io(IoBar),
}

impl Bar {
    /// Base address of the region.
    pub fn base(&self) -> u64 {
        match self {
            Bar::Memory(bar) => bar.base,
            Bar::Io(bar) => bar.base as u64,
        }
    }

    /// Length of the region.
    pub fn size(&self) -> u32 {
        match self {
            Bar::Memory(bar) => bar.size,
            Bar::Io(bar) => bar.size,
        }
    }
}

/// Memory BAR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBar {
    base: u64,
    size: u32,
    prefetchable: bool,
    memory_type: MemoryType,
}

impl MemoryBar {
    /// Base address. 64-bit BARs include the upper dword.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Size of the memory
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether this bar is prefetchable, allowing the CPU to get the data
    /// in advance.
    pub fn prefetchable(&self) -> bool {
        self.prefetchable
    }

    /// Where the BAR may be placed in the address space.
    pub fn memory_type(&self) -> MemoryType {
        self.memory_type
    }
}

/// I/O port BAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBar {
    base: u32,
    size: u32,
}

impl IoBar {
    /// Base port
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Size of the port
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// The type field (bits 2:1) of a memory BAR.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryType {
    /// Anywhere in the 32-bit space.
    Bits32,
    /// Below 1 MiB. Legacy, reserved since PCI 2.2.
    Below1MiB,
    /// Anywhere in the 64-bit space; takes two slots.
    Bits64,
    /// Reserved encoding.
    Reserved,
}

impl MemoryType {
    /// Extracts the type field from a BAR's `kind` bits.
    pub fn from_kind(kind: u8) -> Self {
        match kind.get_bits(1..3) {
            0 => Self::Bits32,
            1 => Self::Below1MiB,
            2 => Self::Bits64,
            _ => Self::Reserved,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bus::pci::fake::{FakeConfigSpace, FakeFunction};

    #[test]
    fn io_bar_is_decoded_with_16_bit_masks() {
        let bar = decode_bar(0x0000_C001, 0xFFFF_FFE1);
        assert_eq!(bar.base, 0xC000);
        assert_eq!(bar.size, 0x20);
        assert_eq!(bar.kind, 0x1);
        assert!(!bar.is_64bit());
    }

    #[test]
    fn io_bar_size_is_a_power_of_two_up_to_64k() {
        for bits in 2..16 {
            let mask = (0xFFFF_FFFFu32 << bits) | 1;
            let bar = decode_bar(0xC001, mask);
            assert_eq!(bar.size, 1 << bits);
            assert!(bar.size.is_power_of_two());
        }
        // Nothing hardwired: the full 64 KiB port space.
        assert_eq!(decode_bar(0x1, 0x1).size, 0x1_0000);
    }

    #[test]
    fn memory_bar_size_is_a_power_of_two() {
        for bits in 4..32 {
            let mask = 0xFFFF_FFFFu32 << bits;
            let bar = decode_bar(0xE000_0000, mask);
            assert_eq!(bar.size, 1 << bits);
            assert!(bar.size.is_power_of_two());
        }
        // 2^32 does not fit the size field and wraps to zero.
        assert_eq!(decode_bar(0, 0).size, 0);
    }

    #[test]
    fn decoding_is_idempotent() {
        for (raw, mask) in [
            (0xFEBC_0004, 0xFFFF_0000),
            (0x0000_C001, 0xFFFF_FFC1),
            (0xF000_0008, 0xFFF0_0008),
            (0, 0),
        ] {
            assert_eq!(decode_bar(raw, mask), decode_bar(raw, mask));
        }
    }

    #[test]
    fn prefetchable_64bit_memory_bar() {
        let bar = decode_bar(0xFEBC_000C, 0xFFFF_C00C);
        assert_eq!(bar.base, 0xFEBC_0000);
        assert_eq!(bar.size, 0x4000);
        assert_eq!(bar.kind, 0xC);
        assert!(bar.is_64bit());
        assert_eq!(MemoryType::from_kind(bar.kind), MemoryType::Bits64);
    }

    #[test]
    fn io_bar_with_address_bit_2_is_not_64bit() {
        // Bit 2 of an I/O BAR is an address bit, not a type field.
        let bar = decode_bar(0x0000_C005, 0xFFFF_FFF1);
        assert_eq!(bar.kind, 0x5);
        assert!(!bar.is_64bit());
    }

    #[test]
    fn sizing_restores_the_operational_value() {
        let location = PciDeviceLocation::new(0, 1, 0).unwrap();
        let mut function = FakeFunction::device(0x1234, 0x5678);
        function.set_bar(2, 0xE000_0000, 0xFFF0_0000);
        let port = FakeConfigSpace::new().with_function(location, function).into_port();

        let (raw, mask) = size_bar(&mut port.lock(), &location, 2);
        assert_eq!((raw, mask), (0xE000_0000, 0xFFF0_0000));

        let fake = port.into_inner();
        assert_eq!(fake.register(&location, 0x18), 0xE000_0000);
        assert_eq!(
            fake.writes_to(&location, 0x18),
            [0xFFFF_FFFF, 0xE000_0000]
        );
    }

    #[test]
    fn the_64bit_upper_slot_is_a_raw_continuation() {
        let location = PciDeviceLocation::new(0, 3, 0).unwrap();
        let mut function = FakeFunction::device(0x8086, 0x100E);
        function.set_bar(0, 0xFEBC_0004, 0xFFFF_0000);
        function.set_bar(1, 0x0000_0001, 0xFFFF_FFFF);
        function.set_bar(2, 0x0000_C001, 0xFFFF_FFC1);
        let port = FakeConfigSpace::new().with_function(location, function).into_port();

        let slots = decode_bars(&mut port.lock(), &location);
        assert_eq!(slots.base[0], 0xFEBC_0000);
        assert_eq!(slots.size[0], 0x1_0000);
        assert_eq!(MemoryType::from_kind(slots.kind[0]), MemoryType::Bits64);
        assert_eq!((slots.base[1], slots.size[1], slots.kind[1]), (1, 0, 0));
        assert_eq!((slots.base[2], slots.size[2], slots.kind[2]), (0xC000, 0x40, 1));

        // The upper half is read once and never sized.
        let fake = port.into_inner();
        assert!(fake.writes_to(&location, 0x14).is_empty());

        assert!(slots.is_continuation(1));
        assert_eq!(slots.bar(1), None);
        let Some(Bar::Memory(bar)) = slots.bar(0) else {
            panic!("BAR0 must be a memory BAR");
        };
        assert_eq!(bar.base(), 0x1_FEBC_0000);
        assert_eq!(bar.memory_type(), MemoryType::Bits64);
        assert!(!bar.prefetchable());
        assert_eq!(
            slots.iter().map(|(index, _)| index).collect::<alloc::vec::Vec<_>>(),
            [0, 2]
        );
    }

    #[test]
    fn a_64bit_flag_in_the_last_slot_reads_no_continuation() {
        let location = PciDeviceLocation::new(0, 4, 0).unwrap();
        let mut function = FakeFunction::device(0x1AF4, 0x1000);
        function.set_bar(5, 0xF000_0004, 0xFFFF_F000);
        let port = FakeConfigSpace::new().with_function(location, function).into_port();

        let slots = decode_bars(&mut port.lock(), &location);
        assert_eq!(slots.base[5], 0xF000_0000);
        assert_eq!(slots.size[5], 0x1000);
        assert_eq!(slots.bar(5).map(|bar| bar.base()), Some(0xF000_0000));
    }

    #[test]
    fn a_64bit_bar_above_4gib_with_a_zero_low_dword_is_populated() {
        let mut slots = BarSlots::default();
        let bar = decode_bar(0x0000_000C, 0xF000_000C);
        slots.base[0] = bar.base;
        slots.size[0] = bar.size;
        slots.kind[0] = bar.kind;
        slots.base[1] = 0x8;

        let Some(Bar::Memory(bar)) = slots.bar(0) else {
            panic!("BAR0 must be a memory BAR");
        };
        assert_eq!(bar.base(), 0x8_0000_0000);
        assert_eq!(bar.size(), 0x1000_0000);
        assert!(bar.prefetchable());
        assert_eq!(slots.iter().count(), 1);

        // Both dwords zero: unpopulated.
        slots.base[1] = 0;
        assert_eq!(slots.bar(0), None);
        assert_eq!(slots.iter().count(), 0);
    }

    #[test]
    fn memory_type_from_kind() {
        assert_eq!(MemoryType::from_kind(0x0), MemoryType::Bits32);
        assert_eq!(MemoryType::from_kind(0x2), MemoryType::Below1MiB);
        assert_eq!(MemoryType::from_kind(0xC), MemoryType::Bits64);
        assert_eq!(MemoryType::from_kind(0x6), MemoryType::Reserved);
    }
}
