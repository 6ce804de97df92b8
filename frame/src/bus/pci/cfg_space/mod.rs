// SPDX-License-Identifier: MPL-2.0

//! The PCI configuration space.
//!
//! Reference: <https://wiki.osdev.org/PCI>

pub mod access;

macro_rules! define_cfg_space_and_register_offsets {
    (
        $(#[$meta:meta])*
        $vis:vis struct $struct_name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field_name:ident : $field_type:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $struct_name {
            $(
                $(#[$field_meta])*
                $field_vis $field_name: $field_type,
            )*
        }

        impl $struct_name {
            paste::paste! {
                $(
                    #[doc = concat!("Byte offset of the `", stringify!($field_name), "` register.")]
                    pub const [<$field_name:upper>]: u8 =
                        core::mem::offset_of!($struct_name, $field_name) as u8;
                )*
            }
        }
    };
}

define_cfg_space_and_register_offsets!(
    /// PCI device (not for bridge) configuration space header.
    ///
    /// The struct is never instantiated; it pins the register layout that the
    /// generated offset constants are taken from.
    #[repr(C, packed)]
    pub struct PciDeviceCfgSpace {
        /// Vendor ID
        pub vendor_id: u16,
        /// Device ID
        pub device_id: u16,
        /// PCI command register
        pub command: u16,
        /// PCI status register
        pub status: u16,
        /// Revision ID
        pub revision_id: u8,
        /// Programming interface byte
        pub prog_if: u8,
        /// Subclass code
        pub subclass: u8,
        /// Class code
        pub class_code: u8,
        /// Cache line size
        pub cache_line_size: u8,
        /// Master latency timer register
        pub latency_timer: u8,
        /// Header type
        pub header_type: u8,
        /// BIST
        pub bist: u8,
        /// Base address register #0
        pub bar0: u32,
        /// Base address register #1
        pub bar1: u32,
        /// Base address register #2
        pub bar2: u32,
        /// Base address register #3
        pub bar3: u32,
        /// Base address register #4
        pub bar4: u32,
        /// Base address register #5
        pub bar5: u32,
        /// Cardbus CIS pointer
        pub cardbus_cis_ptr: u32,
        /// Subsystem vendor ID
        pub subsystem_vendor_id: u16,
        /// Subsystem ID
        pub subsystem_id: u16,
        /// Expansion ROM base address
        pub xrom_bar: u32,
        /// Capabilities pointer
        pub capabilities_ptr: u8,
        /// Reserved
        pub reserved1: u8,
        /// Reserved
        pub reserved2: u16,
        /// Reserved
        pub reserved3: u32,
        /// Interrupt line
        pub interrupt_line: u8,
        /// Interrupt pin
        pub interrupt_pin: u8,
        /// Min grant register
        pub min_grant: u8,
        /// Max latency register
        pub max_latency: u8,
    }
);

impl PciDeviceCfgSpace {
    /// Size of the legacy configuration space.
    pub const SIZE: usize = 256;

    /// Number of base address registers of a standard device.
    pub const NUM_BARS: usize = 6;

    /// Offset of the BAR at `index`.
    pub const fn bar_offset(index: usize) -> u8 {
        Self::BAR0 + 4 * index as u8
    }
}

/// Set in the dword at [`PciDeviceCfgSpace::CACHE_LINE_SIZE`] when the
/// device implements more than one function.
pub const MULTIFUNCTION_BIT: u32 = 0x0080_0000;
