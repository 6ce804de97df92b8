// SPDX-License-Identifier: MPL-2.0

//! The discovered PCI functions, in discovery order.

use crate::{bus::pci::common_device::PciDeviceRecord, prelude::*, Error};

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 128;

/// An append-only, fixed-capacity list of [`PciDeviceRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDirectory {
    records: Vec<PciDeviceRecord>,
    capacity: usize,
    truncated: bool,
}

impl DeviceDirectory {
    /// Creates an empty directory holding at most `capacity` records.
    ///
    /// Storage for all records is allocated up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    /// An empty directory with no room, for statics that are filled later.
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            capacity: 0,
            truncated: false,
        }
    }

    /// Appends a record.
    ///
    /// Fails with [`Error::NotEnoughResources`] once `capacity` records are
    /// stored; the directory is left unchanged.
    pub fn push(&mut self, record: PciDeviceRecord) -> Result<()> {
        if self.records.len() >= self.capacity {
            return Err(Error::NotEnoughResources);
        }
        self.records.push(record);
        Ok(())
    }

    /// Records that discovery stopped because the directory was full.
    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Whether functions were left out because the directory was full.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The `index`-th discovered record.
    pub fn get(&self, index: usize) -> Option<&PciDeviceRecord> {
        self.records.get(index)
    }

    /// The first record, in discovery order, with this identity.
    pub fn find(&self, vendor_id: u16, device_id: u16) -> Option<&PciDeviceRecord> {
        self.records
            .iter()
            .find(|record| record.vendor_id == vendor_id && record.device_id == device_id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no function was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another `push` would fail.
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Iterates over the records in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &PciDeviceRecord> {
        self.records.iter()
    }
}

impl Default for DeviceDirectory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
