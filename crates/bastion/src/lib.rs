// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # bastion
//!
//! Keep secrets out of swap, out of core dumps, and encrypted while idle.
//!
//! - [`LockedBuffer`]: plaintext in locked pages between two guard pages,
//!   with a canary checked on every access.
//! - [`Enclave`]: the same bytes sealed with XChaCha20-Poly1305 under a
//!   process-wide key that is itself stored split in two and re-masked in
//!   the background.
//!
//! ```rust,no_run
//! use bastion::{Enclave, LockedBuffer};
//!
//! # fn main() -> Result<(), bastion::Error> {
//! let buffer = LockedBuffer::from_bytes(&mut *b"hunter2".to_vec())?;
//! let enclave = buffer.seal()?;
//!
//! // ... later
//! let buffer = enclave.open()?;
//! assert_eq!(&*buffer.data()?, b"hunter2");
//! # Ok(())
//! # }
//! ```
//!
//! # Failure model
//!
//! Errors come in two tiers. Everything in [`Error`] is recoverable. A
//! condition meaning the secure memory can no longer be trusted (a changed
//! canary, a failed protection change, a malformed ciphertext reaching the
//! cipher) is never returned: every live buffer is wiped, the hook set with
//! [`set_panic_hook`] runs, and the process aborts.
//!
//! # Runtime
//!
//! The first buffer or enclave starts the runtime with [`Config::default`].
//! Call [`init`] before that to choose the rotation interval or keep core
//! dumps enabled.

#![warn(missing_docs)]

mod enclave;
mod error;
mod locked_buffer;

pub use bastion_core::{
    BufferView, Config, ConfigError, FatalError, PurgeReport, set_panic_hook,
};
pub use enclave::Enclave;
pub use error::Error;
pub use locked_buffer::LockedBuffer;

use error::escalate;

/// Starts the runtime: core dumps off (unless disabled in `config`), the
/// session key, and the rotation thread.
///
/// # Errors
///
/// - [`Error::AlreadyInitialized`] if called twice, or after any buffer or
///   enclave was created
pub fn init(config: Config) -> Result<(), Error> {
    escalate(bastion_core::init(config))
}

/// Starts the runtime with configuration read from the environment.
///
/// See [`Config::from_env`].
pub fn init_from_env() -> Result<(), Error> {
    let config = Config::from_env().map_err(Error::Config)?;
    init(config)
}

/// Destroys every live buffer and replaces the session key.
///
/// Existing [`LockedBuffer`]s report [`Error::Expired`] afterwards; existing
/// [`Enclave`]s fail with [`Error::Authentication`]. Meant for shutdown
/// paths.
///
/// Waits up to one second per buffer for its lock. A buffer still locked
/// after that, for example because the calling thread holds a
/// [`BufferView`] of it, is not destroyed and shows up in
/// [`PurgeReport::skipped`]. Drop views before purging.
pub fn purge() -> Result<PurgeReport, Error> {
    escalate(bastion_core::purge())
}

/// Replaces the session key without touching buffers. Existing enclaves
/// can no longer be opened.
pub fn rekey() -> Result<(), Error> {
    escalate(bastion_core::key::rekey())
}
