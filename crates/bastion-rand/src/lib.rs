// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # bastion_rand
//!
//! Cryptographically secure randomness for the bastion stack.
//!
//! Session keys, key-share masks and region canaries are all drawn from the
//! operating system CSPRNG through [`SystemEntropySource`].
//!
//! ```rust
//! use bastion_rand::{EntropySource, SystemEntropySource};
//!
//! let mut key = [0u8; 32];
//! SystemEntropySource {}.fill_bytes(&mut key).expect("Failed to fill_bytes(..)");
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod error;
mod system;
mod traits;

pub use error::EntropyError;
pub use system::SystemEntropySource;
pub use traits::EntropySource;

/// Fills `dest` from the system entropy source.
#[inline]
pub fn fill_random(dest: &mut [u8]) -> Result<(), EntropyError> {
    SystemEntropySource {}.fill_bytes(dest)
}
