// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use bastion_aead::CryptoError;
use bastion_buffer::BufferError;
use bastion_rand::EntropyError;
use thiserror::Error;

use crate::config::ConfigError;

/// Conditions after which secret memory can no longer be trusted.
///
/// The only correct response is to purge and stop the process; see
/// [`terminate`](crate::terminate).
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum FatalError {
    /// A canary or guard-page copy changed.
    #[error("canary mismatch: memory corruption detected")]
    CanaryMismatch = 1,

    /// A page protection change failed.
    #[error("page protection change failed")]
    ProtectionFailed = 2,

    /// A ciphertext too short to hold any plaintext reached decryption.
    #[error("ciphertext length cannot represent a plaintext")]
    InvalidCiphertextLength = 3,

    /// Key material of the wrong length reached the cipher.
    #[error("internal key length mismatch")]
    InvalidKeyLength = 4,
}

/// Errors from coffer, enclave and runtime operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A recoverable buffer condition: invalid size, expired, immutable,
    /// out of bounds, allocation failure.
    #[error(transparent)]
    Buffer(BufferError),

    /// An enclave was requested over zero bytes.
    #[error("enclave plaintext must not be empty")]
    EmptyPlaintext,

    /// Serialized enclave bytes too short to hold any plaintext.
    #[error("malformed enclave ciphertext: {0} bytes")]
    MalformedCiphertext(usize),

    /// The ciphertext did not verify: tampered, or sealed under another key.
    #[error("authentication failed")]
    Authentication,

    /// The plaintext is too long to encrypt in one message.
    #[error("plaintext too long: {0} bytes")]
    PlaintextTooLong(usize),

    /// No randomness available.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// The coffer's shares have been wiped.
    #[error("coffer has been destroyed")]
    CofferDestroyed,

    /// [`init`](crate::init) was called after the runtime had started.
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// The rotation thread could not be spawned.
    #[error("failed to spawn rotation thread: {0}")]
    Rotator(std::io::ErrorKind),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Secret memory can no longer be trusted.
    #[error("fatal: {0}")]
    Fatal(FatalError),
}

impl Error {
    /// Returns true for [`Error::Fatal`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The fatal condition, if any.
    pub fn fatal(&self) -> Option<FatalError> {
        match self {
            Self::Fatal(fatal) => Some(*fatal),
            _ => None,
        }
    }
}

impl From<FatalError> for Error {
    fn from(fatal: FatalError) -> Self {
        Self::Fatal(fatal)
    }
}

impl From<BufferError> for Error {
    fn from(error: BufferError) -> Self {
        match error {
            BufferError::CanaryMismatch => Self::Fatal(FatalError::CanaryMismatch),
            BufferError::Protection(_) => Self::Fatal(FatalError::ProtectionFailed),
            BufferError::Entropy(e) => Self::Entropy(e),
            other => Self::Buffer(other),
        }
    }
}

impl From<CryptoError> for Error {
    fn from(error: CryptoError) -> Self {
        match error {
            CryptoError::InvalidKeyLength(_) => Self::Fatal(FatalError::InvalidKeyLength),
            CryptoError::CiphertextTooShort(_) | CryptoError::OutputLength { .. } => {
                Self::Fatal(FatalError::InvalidCiphertextLength)
            }
            CryptoError::PlaintextTooLong(len) => Self::PlaintextTooLong(len),
            CryptoError::Authentication => Self::Authentication,
            CryptoError::Entropy(e) => Self::Entropy(e),
        }
    }
}
