// SPDX-License-Identifier: MPL-2.0

//! Serialized access to the legacy PCI configuration space.

use core::fmt;

use spin::{Mutex, MutexGuard};

use crate::{Error, Result};

/// PCI device Location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PciDeviceLocation {
    /// Bus number
    pub bus: u8,
    /// Device number
    pub device: u8,
    /// Function number
    pub function: u8,
}

impl PciDeviceLocation {
    /// The largest device number on a bus.
    pub const MAX_DEVICE: u8 = 31;
    /// The largest function number of a device.
    pub const MAX_FUNCTION: u8 = 7;

    /// Creates a location, rejecting device and function numbers the
    /// configuration address cannot encode.
    pub fn new(bus: u8, device: u8, function: u8) -> Result<Self> {
        if device > Self::MAX_DEVICE || function > Self::MAX_FUNCTION {
            return Err(Error::InvalidArgs);
        }
        Ok(Self {
            bus,
            device,
            function,
        })
    }

    /// The same device slot with a different function number.
    ///
    /// Only the low 3 bits of `function` are kept, the same truncation the
    /// configuration address applies.
    pub fn with_function(self, function: u8) -> Self {
        Self {
            function: function & Self::MAX_FUNCTION,
            ..self
        }
    }

    /// Returns an iterator over every device slot (function 0) of every bus.
    pub fn all_slots() -> impl Iterator<Item = PciDeviceLocation> {
        (0..=u8::MAX).flat_map(|bus| {
            (0..=Self::MAX_DEVICE).map(move |device| PciDeviceLocation {
                bus,
                device,
                function: 0,
            })
        })
    }

    /// Encodes the location and a register offset into the word written to
    /// the configuration address port.
    pub fn config_address(&self, offset: u8) -> u32 {
        // 1 << 31: Configuration enable
        (1 << 31)
            | ((self.bus as u32) << 16)
            | (((self.device as u32) & 0b11111) << 11)
            | (((self.function as u32) & 0b111) << 8)
            | ((offset as u32) & 0xFC)
    }
}

impl fmt::Display for PciDeviceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.bus, self.device, self.function)
    }
}

/// A mechanism that reads and writes configuration-space dwords.
///
/// `offset` is a byte offset into the 256-byte configuration space. Its low
/// two bits are ignored. Absent functions read as `0xFFFF_FFFF`.
pub trait PciConfigAccess {
    /// Reads the dword at `offset`.
    fn read32(&mut self, location: &PciDeviceLocation, offset: u8) -> u32;

    /// Writes the dword at `offset`.
    fn write32(&mut self, location: &PciDeviceLocation, offset: u8, value: u32);
}

/// The value a configuration read returns when no function responds.
pub const ABSENT: u32 = 0xFFFF_FFFF;

/// The machine-wide configuration-space port.
///
/// Every multi-step sequence (presence test, probe, BAR sizing) must run
/// under one [`ConfigSpaceGuard`].
pub struct ConfigSpacePort<A> {
    access: Mutex<A>,
}

impl<A: PciConfigAccess> ConfigSpacePort<A> {
    /// Wraps a configuration-space mechanism.
    pub const fn new(access: A) -> Self {
        Self {
            access: Mutex::new(access),
        }
    }

    /// Acquires exclusive access until the returned guard is dropped.
    pub fn lock(&self) -> ConfigSpaceGuard<'_, A> {
        ConfigSpaceGuard {
            access: self.access.lock(),
        }
    }

    /// Consumes the port and returns the mechanism.
    pub fn into_inner(self) -> A {
        self.access.into_inner()
    }
}

/// Exclusive access to the configuration space.
pub struct ConfigSpaceGuard<'a, A> {
    access: MutexGuard<'a, A>,
}

impl<A: PciConfigAccess> ConfigSpaceGuard<'_, A> {
    /// Reads the dword at `offset`.
    pub fn read32(&mut self, location: &PciDeviceLocation, offset: u8) -> u32 {
        self.access.read32(location, offset & !0b11)
    }

    /// Writes the dword at `offset`.
    pub fn write32(&mut self, location: &PciDeviceLocation, offset: u8, value: u32) {
        self.access.write32(location, offset & !0b11, value)
    }

    /// Whether a function answers at `location`.
    pub fn is_present(&mut self, location: &PciDeviceLocation) -> bool {
        self.read32(location, 0) != ABSENT
    }
}
