// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # bastion_core
//!
//! The key-management half of bastion.
//!
//! - [`Coffer`]: one 32-byte session key held as two XOR shares in separate
//!   guarded buffers. The whole key only exists inside a short-lived
//!   [`Buffer`] returned by [`Coffer::view`].
//! - [`key`]: the process-wide "current coffer", swapped atomically so
//!   lookups never take a global lock.
//! - [`Rotator`]: background thread that re-masks the current coffer's
//!   shares on a fixed interval. The key itself does not change, so every
//!   [`Enclave`] stays openable across rotations.
//! - [`Enclave`]: XChaCha20-Poly1305 ciphertext of a buffer's contents.
//! - [`purge`] and [`terminate`]: wipe every live buffer, on demand or on a
//!   fatal condition.
//!
//! Fatal conditions (corrupted canary, failed protection change, malformed
//! ciphertext, key-length mismatch) are returned as [`Error::Fatal`]. This
//! crate never terminates from a call path that has a caller to return to;
//! the top-level handler decides, normally by calling [`terminate`].
//!
//! ```rust,no_run
//! use bastion_core::{Buffer, Enclave};
//!
//! # fn main() -> Result<(), bastion_core::Error> {
//! let mut secret = *b"api-token-123";
//! let enclave = Enclave::new(&mut secret)?;
//! assert_eq!(secret, [0u8; 13]);
//!
//! let buffer: Buffer = enclave.open()?;
//! assert_eq!(&*buffer.data()?, b"api-token-123");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod coffer;
mod config;
mod enclave;
mod error;
mod fatal;
mod purge;
mod rotation;
mod runtime;

pub mod key;

pub use bastion_buffer::registry::PurgeReport;
pub use bastion_buffer::{Buffer, BufferError, BufferView};
pub use coffer::Coffer;
pub use config::{
    Config, ConfigError, DEFAULT_ROTATION_INTERVAL, ENV_DISABLE_CORE_DUMPS,
    ENV_ROTATION_INTERVAL_MS,
};
pub use enclave::Enclave;
pub use error::{Error, FatalError};
pub use fatal::{set_panic_hook, terminate};
pub use purge::{PURGE_LOCK_WAIT, purge};
pub use rotation::Rotator;
pub use runtime::{config, ensure_started, init, is_initialized};
