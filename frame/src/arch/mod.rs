// SPDX-License-Identifier: MPL-2.0

//! Platform-specific code.
//!
//! Only x86-64 has the legacy `0xCF8`/`0xCFC` configuration mechanism and a
//! port-mapped serial console. Other architectures build without both and
//! expose [`has_pci_pio`] as `false`.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub mod x86;
        pub use self::x86::*;
    } else {
        pub mod other;
        pub use self::other::*;
    }
}
