// SPDX-License-Identifier: MPL-2.0

//! Trace points of the PCI scan.

use core::fmt;

use log::{debug, warn};

use super::{common_device::PciDeviceRecord, device_info::HeaderLayout};

/// Receives the scan's trace points. Every method defaults to doing nothing.
pub trait ScanObserver {
    /// A function was probed and is about to be recorded.
    fn device(&mut self, _record: &PciDeviceRecord) {}

    /// The probed function is a PCI-to-PCI bridge. Follows its `device`.
    fn bridge(&mut self, _record: &PciDeviceRecord) {}

    /// The probed function has a header layout that is not decoded. Follows
    /// its `device`.
    fn unknown_header(&mut self, _record: &PciDeviceRecord) {}

    /// The directory is full and the scan stops.
    fn truncated(&mut self, _capacity: usize) {}
}

/// Ignores every trace point.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Writes every trace point to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ScanObserver for LogObserver {
    fn device(&mut self, record: &PciDeviceRecord) {
        debug!("{}", DeviceLine(record));
    }

    fn bridge(&mut self, record: &PciDeviceRecord) {
        debug!("{} Bridge", record.location);
    }

    fn unknown_header(&mut self, record: &PciDeviceRecord) {
        debug!("{} T={:x}", record.location, record.header_type);
    }

    fn truncated(&mut self, capacity: usize) {
        warn!(
            "PCI: device directory is full ({} devices), remaining functions are not recorded",
            capacity
        );
    }
}

/// One trace line: identity, class and, for standard devices, interrupt
/// routing and the address range of every populated BAR.
pub struct DeviceLine<'a>(pub &'a PciDeviceRecord);

impl fmt::Display for DeviceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        write!(
            f,
            "{} V={:x} D={:x} C={:x}/{:x}/{:x}",
            record.location,
            record.vendor_id,
            record.device_id,
            record.class_code,
            record.subclass,
            record.prog_if
        )?;
        if record.layout() != HeaderLayout::Device {
            return Ok(());
        }
        write!(f, " I={}/{} [", record.int_line, record.int_pin)?;
        for (index, bar) in record.bars.iter() {
            let end = bar.base().wrapping_add(bar.size() as u64).wrapping_sub(1);
            write!(f, " {}:{:x}-{:x}", index, bar.base(), end)?;
        }
        f.write_str(" ]")
    }
}
