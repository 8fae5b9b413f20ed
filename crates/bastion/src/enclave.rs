// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::{Error, escalate};
use crate::locked_buffer::LockedBuffer;

/// Secret bytes encrypted at rest.
///
/// Opening decrypts into a fresh [`LockedBuffer`]; the enclave itself never
/// changes and can be opened again. Key rotation does not affect it; a
/// [`purge`](crate::purge) or [`rekey`](crate::rekey) makes it unopenable.
#[derive(Clone, PartialEq, Eq)]
pub struct Enclave {
    inner: bastion_core::Enclave,
}

impl Enclave {
    pub(crate) fn from_inner(inner: bastion_core::Enclave) -> Self {
        Self { inner }
    }

    /// Seals a copy of `plaintext` and wipes `plaintext`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPlaintext`] if `plaintext` is empty
    pub fn new(plaintext: &mut [u8]) -> Result<Self, Error> {
        escalate(bastion_core::Enclave::new(plaintext)).map(Self::from_inner)
    }

    /// Decrypts into a new buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the enclave was altered or the key
    ///   replaced since sealing
    pub fn open(&self) -> Result<LockedBuffer, Error> {
        escalate(self.inner.open()).map(LockedBuffer::from_inner)
    }

    /// Plaintext length.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Wraps serialized enclave bytes (`nonce ‖ ciphertext ‖ tag`).
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedCiphertext`] if too short to hold any plaintext
    pub fn from_ciphertext(ciphertext: Vec<u8>) -> Result<Self, Error> {
        escalate(bastion_core::Enclave::from_ciphertext(ciphertext)).map(Self::from_inner)
    }

    /// The serialized form.
    pub fn as_ciphertext(&self) -> &[u8] {
        self.inner.as_ciphertext()
    }

    /// Consumes the enclave, returning the serialized form.
    pub fn into_ciphertext(self) -> Vec<u8> {
        self.inner.into_ciphertext()
    }
}

impl core::fmt::Debug for Enclave {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.inner, f)
    }
}
