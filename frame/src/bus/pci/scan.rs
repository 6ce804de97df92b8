// SPDX-License-Identifier: MPL-2.0

//! Sweeping every bus, device and function.

use log::info;

use super::{
    cfg_space::{
        access::{ConfigSpaceGuard, ConfigSpacePort, PciConfigAccess, PciDeviceLocation},
        PciDeviceCfgSpace, MULTIFUNCTION_BIT,
    },
    common_device,
    device_info::HeaderLayout,
    directory::{DeviceDirectory, DEFAULT_CAPACITY},
    trace::ScanObserver,
};
use crate::{cmdline, Error, Result};

/// Which function's header decides whether functions 1 to 7 are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultifunctionCheck {
    /// Function 0's header, and only when function 0 is present. This is
    /// what the PCI specification defines.
    #[default]
    FunctionZero,
    /// The header of the function number left over from the previous
    /// device's function sweep (0 before the first sweep, 0 again after a
    /// full sweep since only 3 bits reach the address word). The check runs
    /// whether or not function 0 answered. An absent function 0 reads as all
    /// ones, so every function of that slot is then tried.
    Legacy,
}

/// Tunables of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum number of records.
    pub capacity: usize,
    /// How multifunction devices are detected.
    pub multifunction_check: MultifunctionCheck,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            multifunction_check: MultifunctionCheck::default(),
        }
    }
}

impl ScanConfig {
    /// Reads `pci.max_devices=<n>` and `pci.multifunction=function0|legacy`
    /// from a kernel command line. Missing or malformed values keep their
    /// defaults.
    pub fn from_cmdline(cmdline: &str) -> Self {
        let mut config = Self::default();
        if let Some(capacity) = cmdline::module_arg(cmdline, "pci", "max_devices")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&capacity| capacity > 0)
        {
            config.capacity = capacity;
        }
        match cmdline::module_arg(cmdline, "pci", "multifunction") {
            Some("legacy") => config.multifunction_check = MultifunctionCheck::Legacy,
            Some("function0") => config.multifunction_check = MultifunctionCheck::FunctionZero,
            _ => {}
        }
        config
    }
}

/// Enumerates the PCI functions behind a configuration-space port.
#[derive(Debug, Clone, Copy, Default)]
pub struct PciScanner {
    config: ScanConfig,
}

impl PciScanner {
    /// Creates a scanner.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Probes every present function on buses 0 to 255.
    ///
    /// The scan stops at the first function that does not fit; the returned
    /// directory is then marked truncated.
    pub fn scan<A, O>(&self, port: &ConfigSpacePort<A>, observer: &mut O) -> DeviceDirectory
    where
        A: PciConfigAccess,
        O: ScanObserver + ?Sized,
    {
        let mut directory = DeviceDirectory::with_capacity(self.config.capacity);
        let mut stale_function = 0;
        for slot in PciDeviceLocation::all_slots() {
            let mut cfg = port.lock();
            if self
                .scan_slot(&mut cfg, &slot, &mut stale_function, &mut directory, observer)
                .is_err()
            {
                directory.mark_truncated();
                observer.truncated(directory.capacity());
                break;
            }
        }
        info!("PCI: {} functions discovered", directory.len());
        directory
    }

    fn scan_slot<A, O>(
        &self,
        cfg: &mut ConfigSpaceGuard<'_, A>,
        slot: &PciDeviceLocation,
        stale_function: &mut u8,
        directory: &mut DeviceDirectory,
        observer: &mut O,
    ) -> Result<()>
    where
        A: PciConfigAccess,
        O: ScanObserver + ?Sized,
    {
        let present = cfg.is_present(slot);
        if present {
            probe_into(cfg, slot, directory, observer)?;
        }

        let header_source = match self.config.multifunction_check {
            MultifunctionCheck::FunctionZero if present => *slot,
            MultifunctionCheck::FunctionZero => return Ok(()),
            MultifunctionCheck::Legacy => slot.with_function(*stale_function),
        };
        let header = cfg.read32(&header_source, PciDeviceCfgSpace::CACHE_LINE_SIZE);
        if header & MULTIFUNCTION_BIT == 0 {
            return Ok(());
        }

        for function in 1..=PciDeviceLocation::MAX_FUNCTION {
            *stale_function = function + 1;
            let location = slot.with_function(function);
            if cfg.is_present(&location) {
                probe_into(cfg, &location, directory, observer)?;
            }
        }
        Ok(())
    }
}

fn probe_into<A, O>(
    cfg: &mut ConfigSpaceGuard<'_, A>,
    location: &PciDeviceLocation,
    directory: &mut DeviceDirectory,
    observer: &mut O,
) -> Result<()>
where
    A: PciConfigAccess,
    O: ScanObserver + ?Sized,
{
    if directory.is_full() {
        return Err(Error::NotEnoughResources);
    }
    let record = common_device::probe(cfg, location);
    observer.device(&record);
    match record.layout() {
        HeaderLayout::Device => {}
        HeaderLayout::Bridge => observer.bridge(&record),
        HeaderLayout::Unknown(_) => observer.unknown_header(&record),
    }
    directory.push(record)
}
