// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use bastion_rand::EntropyError;
use thiserror::Error;

/// Errors from sealing and opening.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum CryptoError {
    /// The key is not [`KEY_LEN`](crate::KEY_LEN) bytes.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The ciphertext cannot hold a nonce and a tag.
    #[error("ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),

    /// The output slice does not match the plaintext length.
    #[error("output length mismatch: expected {expected} bytes, got {actual}")]
    OutputLength {
        /// Plaintext length implied by the ciphertext.
        expected: usize,
        /// Length of the slice that was passed in.
        actual: usize,
    },

    /// The plaintext exceeds what a single XChaCha20 stream can encrypt.
    #[error("plaintext too long: {0} bytes")]
    PlaintextTooLong(usize),

    /// Tag verification failed: wrong key or altered ciphertext.
    #[error("authentication failed")]
    Authentication,

    /// No randomness for the nonce.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}
