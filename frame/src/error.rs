// SPDX-License-Identifier: MPL-2.0

/// The error type which is returned from the APIs of this crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// An argument is out of the range the hardware can address.
    InvalidArgs,
    /// A fixed-capacity container has no room left.
    NotEnoughResources,
}
