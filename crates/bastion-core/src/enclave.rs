// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Enclave - a buffer's contents encrypted at rest.
//!
//! Sealing and opening both fetch a transient key from a [`Coffer`] and
//! destroy it before returning. The plaintext is only ever handled in
//! guarded buffers: encryption runs in place over the input buffer,
//! decryption writes straight into the output buffer.

use bastion_aead::{OVERHEAD, decrypt_into, encrypt, plaintext_len};
use bastion_buffer::{Buffer, BufferError};
use bastion_util::wipe;

use crate::coffer::Coffer;
use crate::error::{Error, FatalError};
use crate::key;

/// Destroys `buffer` and merges the outcome with `result`. A fatal
/// condition from either side wins.
fn finish<T>(result: Result<T, Error>, buffer: &Buffer) -> Result<T, Error> {
    match (result, buffer.destroy()) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(error), _) if error.is_fatal() => Err(error),
        (_, Err(destroyed)) => Err(destroyed.into()),
        (Err(error), Ok(())) => Err(error),
    }
}

/// Encrypted contents of a buffer.
///
/// The serialized form is `nonce (24) ‖ ciphertext ‖ tag (16)` with no
/// header. An enclave never changes after construction and can be opened
/// any number of times.
#[derive(Clone, PartialEq, Eq)]
pub struct Enclave {
    ciphertext: Vec<u8>,
}

impl Enclave {
    /// Seals a copy of `plaintext` under the global key and wipes
    /// `plaintext`, on success and on failure.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPlaintext`] if `plaintext` is empty
    pub fn new(plaintext: &mut [u8]) -> Result<Self, Error> {
        if plaintext.is_empty() {
            return Err(Error::EmptyPlaintext);
        }

        let coffer = match key::current() {
            Ok(coffer) => coffer,
            Err(error) => {
                wipe(plaintext);
                return Err(error);
            }
        };

        Self::new_with(&coffer, plaintext)
    }

    /// [`Enclave::new`] against a specific coffer.
    pub fn new_with(coffer: &Coffer, plaintext: &mut [u8]) -> Result<Self, Error> {
        if plaintext.is_empty() {
            return Err(Error::EmptyPlaintext);
        }

        let buffer = Buffer::from_bytes(plaintext);
        wipe(plaintext);

        Self::seal_with(coffer, buffer?)
    }

    /// Seals `buffer` under the global key. The buffer is destroyed
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::Buffer`] with [`BufferError::Expired`] if `buffer` was
    ///   already destroyed
    pub fn seal(buffer: Buffer) -> Result<Self, Error> {
        let coffer = key::current();
        Self::seal_with(&*coffer?, buffer)
    }

    /// [`Enclave::seal`] against a specific coffer.
    pub fn seal_with(coffer: &Coffer, buffer: Buffer) -> Result<Self, Error> {
        let result = Self::encrypt_buffer(coffer, &buffer);
        finish(result, &buffer)
    }

    fn encrypt_buffer(coffer: &Coffer, buffer: &Buffer) -> Result<Self, Error> {
        if !buffer.alive() {
            return Err(BufferError::Expired.into());
        }

        // Encryption runs in place and wipes the plaintext.
        buffer.melt()?;

        let key = coffer.view()?;
        let result = key.data().map_err(Error::from).and_then(|key| {
            buffer
                .open_mut(|plaintext| encrypt(plaintext, &key))?
                .map_err(Error::from)
        });
        let ciphertext = finish(result, &key)?;

        Ok(Self { ciphertext })
    }

    /// Decrypts into a new buffer using the global key. The enclave is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the ciphertext was altered or sealed
    ///   under a key that has since been replaced
    /// - [`Error::Fatal`] with [`FatalError::InvalidCiphertextLength`] if the
    ///   ciphertext cannot hold any plaintext
    pub fn open(&self) -> Result<Buffer, Error> {
        let coffer = key::current();
        self.open_with(&*coffer?)
    }

    /// [`Enclave::open`] against a specific coffer.
    pub fn open_with(&self, coffer: &Coffer) -> Result<Buffer, Error> {
        let len = plaintext_len(self.ciphertext.len())
            .filter(|len| *len > 0)
            .ok_or(FatalError::InvalidCiphertextLength)?;

        let buffer = Buffer::new(len)?;
        let result = self.decrypt_into_buffer(coffer, &buffer);

        match result {
            Ok(()) => Ok(buffer),
            Err(error) => finish(Err(error), &buffer),
        }
    }

    fn decrypt_into_buffer(&self, coffer: &Coffer, buffer: &Buffer) -> Result<(), Error> {
        let key = coffer.view()?;
        let result = key.data().map_err(Error::from).and_then(|key| {
            buffer
                .open_mut(|out| decrypt_into(&self.ciphertext, &key, out))?
                .map_err(Error::from)
        });
        finish(result, &key)
    }

    /// Plaintext length. Pure arithmetic, no allocation.
    pub fn size(&self) -> usize {
        plaintext_len(self.ciphertext.len()).unwrap_or(0)
    }

    /// Wraps serialized enclave bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedCiphertext`] if `ciphertext` cannot hold at least
    ///   one byte of plaintext
    pub fn from_ciphertext(ciphertext: Vec<u8>) -> Result<Self, Error> {
        if ciphertext.len() <= OVERHEAD {
            return Err(Error::MalformedCiphertext(ciphertext.len()));
        }

        Ok(Self { ciphertext })
    }

    /// The serialized form.
    pub fn as_ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Consumes the enclave, returning the serialized form.
    pub fn into_ciphertext(self) -> Vec<u8> {
        self.ciphertext
    }

    #[cfg(test)]
    pub(crate) fn from_raw_for_test(ciphertext: Vec<u8>) -> Self {
        Self { ciphertext }
    }
}

impl core::fmt::Debug for Enclave {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Enclave")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}
