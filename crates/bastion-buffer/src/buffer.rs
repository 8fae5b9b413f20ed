// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Buffer - lifecycle, mutability and locking over a [`Region`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use bastion_util::{constant_time_eq, wipe};

use crate::error::BufferError;
use crate::fault;
use crate::page::Protection;
use crate::region::Region;
use crate::registry;

/// Read view over a buffer's data. Holds the buffer's shared lock until
/// dropped, so the buffer cannot be written or destroyed meanwhile.
pub type BufferView<'a> = MappedRwLockReadGuard<'a, [u8]>;

struct State {
    region: Option<Region>,
    mutable: bool,
}

pub(crate) struct Shared {
    state: RwLock<State>,
}

impl Shared {
    /// Returns `Ok(true)` if this call performed the destruction.
    pub(crate) fn destroy(&self) -> Result<bool, BufferError> {
        let region = self.state.write().region.take();
        Self::release(region)
    }

    /// Like [`Shared::destroy`], but gives up after `timeout` if the lock is
    /// held elsewhere.
    pub(crate) fn try_destroy_for(&self, timeout: Duration) -> Option<Result<bool, BufferError>> {
        let region = self.state.try_write_for(timeout)?.region.take();
        Some(Self::release(region))
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state.read_recursive().region.is_some()
    }

    fn release(region: Option<Region>) -> Result<bool, BufferError> {
        match region {
            Some(region) => region.destroy().map(|_| true),
            None => Ok(false),
        }
    }
}

/// A secure container for secret bytes.
///
/// Backed by a guarded, locked [`Region`]. Reads take a shared lock; writes,
/// protection changes and destruction take an exclusive one. Once destroyed
/// every access fails with [`BufferError::Expired`].
///
/// Dropping a `Buffer` destroys it.
pub struct Buffer {
    shared: Arc<Shared>,
}

impl Buffer {
    /// Allocates a mutable, zeroed buffer of exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// - [`BufferError::InvalidSize`] if `len` is zero (nothing is allocated)
    /// - [`BufferError::Alloc`] if the secure allocator refuses
    pub fn new(len: usize) -> Result<Self, BufferError> {
        let region = Region::allocate(len)?;

        let shared = Arc::new(Shared {
            state: RwLock::new(State {
                region: Some(region),
                mutable: true,
            }),
        });
        registry::register(&shared);

        Ok(Self { shared })
    }

    /// Allocates a buffer holding a copy of `src`, then wipes `src`.
    pub fn from_bytes(src: &mut [u8]) -> Result<Self, BufferError> {
        let buffer = Self::new(src.len())?;
        buffer.move_from(src)?;
        Ok(buffer)
    }

    /// Allocates a buffer of `len` random bytes.
    pub fn random(len: usize) -> Result<Self, BufferError> {
        let buffer = Self::new(len)?;
        buffer.scramble()?;
        Ok(buffer)
    }

    /// Returns false once the buffer has been destroyed. Never fails.
    pub fn alive(&self) -> bool {
        self.shared.is_alive()
    }

    /// Usable length in bytes; zero once destroyed.
    pub fn len(&self) -> usize {
        self.shared
            .state
            .read_recursive()
            .region
            .as_ref()
            .map_or(0, Region::len)
    }

    /// Returns true once destroyed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns false while frozen.
    pub fn is_mutable(&self) -> bool {
        self.shared.state.read_recursive().mutable
    }

    /// Returns a read view of the data (no copy).
    ///
    /// The view holds the shared lock: drop it before writing to, sealing or
    /// destroying the same buffer from this thread. Further reads from the
    /// holding thread succeed even while a writer is queued.
    pub fn data(&self) -> Result<BufferView<'_>, BufferError> {
        let guard = self.shared.state.read_recursive();

        guard
            .region
            .as_ref()
            .ok_or(BufferError::Expired)?
            .verify_canary()?;

        RwLockReadGuard::try_map(guard, |state| {
            state.region.as_ref().and_then(|region| region.data().ok())
        })
        .map_err(|_| BufferError::NoAccess)
    }

    /// Runs `f` over the data under the shared lock.
    pub fn open<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, BufferError> {
        let view = self.data()?;
        Ok(f(&view))
    }

    /// Runs `f` over the mutable data under the exclusive lock.
    ///
    /// # Errors
    ///
    /// - [`BufferError::Expired`] if destroyed
    /// - [`BufferError::Immutable`] if frozen
    pub fn open_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, BufferError> {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;

        let region = state.region.as_mut().ok_or(BufferError::Expired)?;
        if !state.mutable {
            return Err(BufferError::Immutable);
        }

        region.verify_canary()?;
        let result = f(region.data_mut()?);
        region.verify_canary()?;

        Ok(result)
    }

    /// Copies `bytes` into the buffer at `offset`.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<(), BufferError> {
        self.open_mut(|data| {
            let end = offset
                .checked_add(bytes.len())
                .filter(|end| *end <= data.len())
                .ok_or(BufferError::OutOfBounds {
                    offset,
                    len: bytes.len(),
                    capacity: data.len(),
                })?;

            data[offset..end].copy_from_slice(bytes);
            Ok(())
        })?
    }

    /// Copies as much of `src` as fits, from offset zero. Returns the number
    /// of bytes copied.
    pub fn copy_from(&self, src: &[u8]) -> Result<usize, BufferError> {
        self.open_mut(|data| {
            let n = data.len().min(src.len());
            data[..n].copy_from_slice(&src[..n]);
            n
        })
    }

    /// Like [`Buffer::copy_from`], then wipes `src` (also on failure).
    pub fn move_from(&self, src: &mut [u8]) -> Result<usize, BufferError> {
        let result = self.copy_from(src);
        wipe(src);
        result
    }

    /// Overwrites the data with random bytes.
    pub fn scramble(&self) -> Result<(), BufferError> {
        self.open_mut(bastion_rand::fill_random)??;
        Ok(())
    }

    /// Overwrites the data with zeroes.
    pub fn wipe(&self) -> Result<(), BufferError> {
        self.open_mut(wipe)
    }

    /// Constant-time comparison of the data with `other`.
    pub fn equal(&self, other: &[u8]) -> Result<bool, BufferError> {
        self.open(|data| constant_time_eq(data, other))
    }

    /// Makes the buffer read-only. No-op if already frozen.
    pub fn freeze(&self) -> Result<(), BufferError> {
        self.set_mutable(false)
    }

    /// Makes the buffer writable again. No-op if already mutable.
    pub fn melt(&self) -> Result<(), BufferError> {
        self.set_mutable(true)
    }

    /// Wipes and releases the memory. Idempotent: only the first call does
    /// any work.
    ///
    /// The only possible errors are fatal ones ([`BufferError::is_fatal`]);
    /// the memory is wiped and released regardless.
    pub fn destroy(&self) -> Result<(), BufferError> {
        self.shared.destroy().map(|_| ())
    }

    fn set_mutable(&self, mutable: bool) -> Result<(), BufferError> {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;

        let region = state.region.as_mut().ok_or(BufferError::Expired)?;
        if state.mutable == mutable {
            return Ok(());
        }

        let protection = if mutable {
            Protection::ReadWrite
        } else {
            Protection::ReadOnly
        };

        region.set_protection(protection)?;
        state.mutable = mutable;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn destroy_and_read_back_for_test(
        &self,
    ) -> Option<(Result<(), BufferError>, Vec<u8>)> {
        let region = self.shared.state.write().region.take()?;
        Some(region.destroy_and_read_back_for_test())
    }

    #[cfg(test)]
    pub(crate) fn corrupt_canary_for_test(&self) {
        if let Some(region) = self.shared.state.write().region.as_mut() {
            region.corrupt_canary_for_test();
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Err(error) = self.destroy() {
            fault::raise(error);
        }
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.shared.state.read_recursive();
        f.debug_struct("Buffer")
            .field("len", &state.region.as_ref().map_or(0, Region::len))
            .field("alive", &state.region.is_some())
            .field("mutable", &state.mutable)
            .finish_non_exhaustive()
    }
}
