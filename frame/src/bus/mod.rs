// SPDX-License-Identifier: MPL-2.0

//! Bus operations

pub mod pci;
