// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use bastion_core::{Buffer, BufferView};

use crate::enclave::Enclave;
use crate::error::{Error, escalate};

/// A buffer of secret bytes in locked, guarded memory.
///
/// Starts mutable. Reads take a shared lock, so many threads can read at
/// once; writes, [`freeze`](Self::freeze)/[`melt`](Self::melt) and
/// [`destroy`](Self::destroy) take an exclusive one. After destruction
/// every access fails with [`Error::Expired`].
///
/// Dropping a `LockedBuffer` wipes it.
pub struct LockedBuffer {
    inner: Buffer,
}

impl LockedBuffer {
    pub(crate) fn from_inner(inner: Buffer) -> Self {
        Self { inner }
    }

    /// Allocates `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSize`] if `len` is zero
    /// - [`Error::Alloc`] if locked memory is not available
    pub fn new(len: usize) -> Result<Self, Error> {
        escalate(bastion_core::ensure_started())?;
        escalate(Buffer::new(len)).map(Self::from_inner)
    }

    /// Moves `src` into a new buffer, wiping `src`.
    pub fn from_bytes(src: &mut [u8]) -> Result<Self, Error> {
        escalate(bastion_core::ensure_started())?;
        escalate(Buffer::from_bytes(src)).map(Self::from_inner)
    }

    /// Allocates `len` random bytes.
    pub fn random(len: usize) -> Result<Self, Error> {
        escalate(bastion_core::ensure_started())?;
        escalate(Buffer::random(len)).map(Self::from_inner)
    }

    /// Returns false once destroyed.
    pub fn alive(&self) -> bool {
        self.inner.alive()
    }

    /// Length in bytes; zero once destroyed.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true once destroyed.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns false while frozen.
    pub fn is_mutable(&self) -> bool {
        self.inner.is_mutable()
    }

    /// Read view of the bytes. Holds the shared lock until dropped.
    pub fn data(&self) -> Result<BufferView<'_>, Error> {
        escalate(self.inner.data())
    }

    /// Runs `f` over the bytes.
    pub fn open<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        escalate(self.inner.open(f))
    }

    /// Runs `f` over the bytes, mutably.
    pub fn open_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, Error> {
        escalate(self.inner.open_mut(f))
    }

    /// Copies `bytes` in at `offset`.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<(), Error> {
        escalate(self.inner.write(offset, bytes))
    }

    /// Copies as much of `src` as fits. Returns the number of bytes copied.
    pub fn copy_from(&self, src: &[u8]) -> Result<usize, Error> {
        escalate(self.inner.copy_from(src))
    }

    /// Like [`copy_from`](Self::copy_from), then wipes `src`.
    pub fn move_from(&self, src: &mut [u8]) -> Result<usize, Error> {
        escalate(self.inner.move_from(src))
    }

    /// Overwrites the bytes with random data.
    pub fn scramble(&self) -> Result<(), Error> {
        escalate(self.inner.scramble())
    }

    /// Overwrites the bytes with zeroes.
    pub fn wipe(&self) -> Result<(), Error> {
        escalate(self.inner.wipe())
    }

    /// Constant-time comparison with `other`.
    pub fn equal(&self, other: &[u8]) -> Result<bool, Error> {
        escalate(self.inner.equal(other))
    }

    /// Makes the buffer read-only.
    pub fn freeze(&self) -> Result<(), Error> {
        escalate(self.inner.freeze())
    }

    /// Makes the buffer writable.
    pub fn melt(&self) -> Result<(), Error> {
        escalate(self.inner.melt())
    }

    /// Wipes and releases the memory. Safe to call more than once.
    pub fn destroy(&self) {
        // Only fatal conditions can fail here; escalate never returns them.
        let _ = escalate(self.inner.destroy());
    }

    /// Encrypts the contents into an [`Enclave`] and destroys this buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::Expired`] if the buffer was already destroyed
    pub fn seal(self) -> Result<Enclave, Error> {
        escalate(bastion_core::Enclave::seal(self.inner)).map(Enclave::from_inner)
    }
}

impl core::fmt::Debug for LockedBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.inner, f)
    }
}
