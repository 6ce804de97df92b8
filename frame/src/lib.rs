// SPDX-License-Identifier: MPL-2.0

//! The hardware access layer of the xk kernel.
//!
//! It owns the legacy PCI configuration mechanism, the PCI bus sweep built on
//! top of it, and the early serial console used for diagnostics.
#![no_std]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod arch;
pub mod bus;
pub mod cmdline;
pub mod console;
mod error;
pub mod prelude;

pub use self::{error::Error, prelude::Result};
