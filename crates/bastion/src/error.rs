// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use bastion_buffer::{BufferError, PageError};
use bastion_core::{ConfigError, FatalError};
use bastion_rand::EntropyError;
use thiserror::Error;

/// Recoverable errors. Fatal conditions never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A buffer of zero bytes was requested.
    #[error("buffer size must be greater than zero")]
    InvalidSize,

    /// The buffer was destroyed, sealed or purged.
    #[error("buffer has been destroyed")]
    Expired,

    /// The buffer is frozen.
    #[error("buffer is immutable")]
    Immutable,

    /// The buffer's memory is set to no-access.
    #[error("buffer memory is not accessible")]
    NoAccess,

    /// A write would cross the end of the buffer.
    #[error("write of {len} bytes at offset {offset} exceeds buffer of {capacity} bytes")]
    OutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Requested write length.
        len: usize,
        /// Buffer length.
        capacity: usize,
    },

    /// Locked memory could not be allocated. Often `RLIMIT_MEMLOCK`.
    #[error("allocation failed: {0}")]
    Alloc(PageError),

    /// No randomness available.
    #[error(transparent)]
    Entropy(EntropyError),

    /// An enclave was requested over zero bytes.
    #[error("enclave plaintext must not be empty")]
    EmptyPlaintext,

    /// Serialized enclave bytes too short to hold any plaintext.
    #[error("malformed enclave ciphertext: {0} bytes")]
    MalformedCiphertext(usize),

    /// The enclave was altered, or sealed under a key since replaced.
    #[error("authentication failed")]
    Authentication,

    /// The plaintext is too long to seal.
    #[error("plaintext too long: {0} bytes")]
    PlaintextTooLong(usize),

    /// The session key was wiped while in use.
    #[error("session key has been destroyed")]
    KeyDestroyed,

    /// [`init`](crate::init) came after the runtime had started.
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// The rotation thread could not be spawned.
    #[error("failed to spawn rotation thread: {0}")]
    Rotator(std::io::ErrorKind),

    /// Invalid configuration.
    #[error(transparent)]
    Config(ConfigError),
}

impl TryFrom<bastion_core::Error> for Error {
    type Error = FatalError;

    fn try_from(error: bastion_core::Error) -> Result<Self, FatalError> {
        use bastion_core::Error as Core;

        Ok(match error {
            Core::Buffer(buffer) => match buffer {
                BufferError::InvalidSize => Self::InvalidSize,
                BufferError::Expired => Self::Expired,
                BufferError::Immutable => Self::Immutable,
                BufferError::NoAccess => Self::NoAccess,
                BufferError::OutOfBounds {
                    offset,
                    len,
                    capacity,
                } => Self::OutOfBounds {
                    offset,
                    len,
                    capacity,
                },
                BufferError::Alloc(page) => Self::Alloc(page),
                BufferError::Entropy(e) => Self::Entropy(e),
                BufferError::CanaryMismatch => return Err(FatalError::CanaryMismatch),
                BufferError::Protection(_) => return Err(FatalError::ProtectionFailed),
            },
            Core::EmptyPlaintext => Self::EmptyPlaintext,
            Core::MalformedCiphertext(len) => Self::MalformedCiphertext(len),
            Core::Authentication => Self::Authentication,
            Core::PlaintextTooLong(len) => Self::PlaintextTooLong(len),
            Core::Entropy(e) => Self::Entropy(e),
            Core::CofferDestroyed => Self::KeyDestroyed,
            Core::AlreadyInitialized => Self::AlreadyInitialized,
            Core::Rotator(kind) => Self::Rotator(kind),
            Core::Config(e) => Self::Config(e),
            Core::Fatal(fatal) => return Err(fatal),
        })
    }
}

/// The single top-level handler for fatal conditions: recoverable errors
/// pass through, fatal ones purge and terminate.
pub(crate) fn escalate<T, E>(result: Result<T, E>) -> Result<T, Error>
where
    E: Into<bastion_core::Error>,
{
    result.map_err(|error| match Error::try_from(error.into()) {
        Ok(error) => error,
        Err(fatal) => bastion_core::terminate(fatal),
    })
}
