// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Region - a single guarded allocation.
//!
//! Layout of the mapping (`P` = page size):
//!
//! ```text
//! [0, P)                    leading guard page, no-access, starts with a canary copy
//! [P, P + inner)            inner pages: canary followed by the data, data flush with the end
//! [P + inner, 2P + inner)   trailing guard page, no-access, starts with a canary copy
//! ```
//!
//! The canary reference lives outside the mapping and is compared in
//! constant time against the in-mapping copy on every access boundary.

use bastion_util::{constant_time_eq, wipe};

use crate::error::{BufferError, PageError};
use crate::page::{Pages, Protection, page_size, round_to_pages};

/// Minimum number of canary bytes in front of the data.
pub const CANARY_LEN: usize = 32;

/// A canary-checked allocation flanked by inaccessible guard pages.
pub struct Region {
    pages: Pages,
    page: usize,
    inner_len: usize,
    len: usize,
    canary: Box<[u8]>,
    protection: Protection,
}

impl Region {
    /// Allocates `len` usable bytes. The data starts zeroed and read-write.
    pub fn allocate(len: usize) -> Result<Self, BufferError> {
        if len == 0 {
            return Err(BufferError::InvalidSize);
        }

        let page = page_size();
        let inner_len = len
            .checked_add(CANARY_LEN)
            .and_then(round_to_pages)
            .ok_or(BufferError::Alloc(PageError::Size))?;
        let total = page
            .checked_mul(2)
            .and_then(|guards| guards.checked_add(inner_len))
            .ok_or(BufferError::Alloc(PageError::Size))?;

        let mut pages = Pages::reserve(total).map_err(BufferError::Alloc)?;

        let mut canary = vec![0u8; inner_len - len].into_boxed_slice();
        bastion_rand::fill_random(&mut canary)?;

        let guard_copy = canary.len().min(page);

        // Safety: a fresh mapping is read-write end to end.
        unsafe {
            pages.slice_mut(page, canary.len()).copy_from_slice(&canary);
            pages
                .slice_mut(0, guard_copy)
                .copy_from_slice(&canary[..guard_copy]);
            pages
                .slice_mut(page + inner_len, guard_copy)
                .copy_from_slice(&canary[..guard_copy]);
        }

        pages
            .protect(0, page, Protection::NoAccess)
            .and_then(|_| pages.protect(page + inner_len, page, Protection::NoAccess))
            .map_err(BufferError::Protection)?;

        Ok(Self {
            pages,
            page,
            inner_len,
            len,
            canary,
            protection: Protection::ReadWrite,
        })
    }

    /// Usable length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: zero-length regions cannot be allocated.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Current protection of the inner pages.
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Compares the in-mapping canary against the reference.
    ///
    /// Fails with [`BufferError::NoAccess`] while the inner pages are
    /// no-access; the check then happens on the next transition to a
    /// readable mode.
    pub fn verify_canary(&self) -> Result<(), BufferError> {
        if !self.protection.is_readable() {
            return Err(BufferError::NoAccess);
        }

        // Safety: inner pages are readable.
        let current = unsafe { self.pages.slice(self.page, self.canary.len()) };

        if !constant_time_eq(current, &self.canary) {
            return Err(BufferError::CanaryMismatch);
        }

        Ok(())
    }

    /// Moves the inner pages to `protection`. No-op if already there.
    pub fn set_protection(&mut self, protection: Protection) -> Result<(), BufferError> {
        if protection == self.protection {
            return Ok(());
        }

        self.pages
            .protect(self.page, self.inner_len, protection)
            .map_err(BufferError::Protection)?;
        self.protection = protection;

        if protection.is_readable() {
            self.verify_canary()?;
        }

        Ok(())
    }

    /// Read view of the data.
    pub fn data(&self) -> Result<&[u8], BufferError> {
        if !self.protection.is_readable() {
            return Err(BufferError::NoAccess);
        }

        // Safety: inner pages are readable.
        Ok(unsafe { self.pages.slice(self.data_offset(), self.len) })
    }

    /// Mutable view of the data.
    pub fn data_mut(&mut self) -> Result<&mut [u8], BufferError> {
        match self.protection {
            Protection::NoAccess => Err(BufferError::NoAccess),
            Protection::ReadOnly => Err(BufferError::Immutable),
            Protection::ReadWrite => {
                let offset = self.data_offset();
                // Safety: inner pages are read-write.
                Ok(unsafe { self.pages.slice_mut(offset, self.len) })
            }
        }
    }

    /// Wipes and releases the region.
    ///
    /// Memory is wiped and unmapped whatever the outcome; the returned error
    /// reports corruption found on the way (canary or guard-page copies
    /// altered) or a protection change that could not be made.
    pub fn destroy(mut self) -> Result<(), BufferError> {
        self.wipe_and_verify()
    }

    fn wipe_and_verify(&mut self) -> Result<(), BufferError> {
        let tail = self.page + self.inner_len;
        let total = self.pages.len();

        self.pages
            .protect(0, total, Protection::ReadWrite)
            .map_err(BufferError::Protection)?;
        self.protection = Protection::ReadWrite;

        let guard_copy = self.canary.len().min(self.page);

        // Safety: the whole mapping is read-write.
        let intact = unsafe {
            constant_time_eq(self.pages.slice(self.page, self.canary.len()), &self.canary)
                & constant_time_eq(self.pages.slice(0, guard_copy), &self.canary[..guard_copy])
                & constant_time_eq(self.pages.slice(tail, guard_copy), &self.canary[..guard_copy])
        };

        // Safety: as above.
        wipe(unsafe { self.pages.slice_mut(self.page, self.inner_len) });

        if !intact {
            return Err(BufferError::CanaryMismatch);
        }

        Ok(())
    }

    fn data_offset(&self) -> usize {
        self.page + self.inner_len - self.len
    }

    /// Runs [`Region::destroy`] and returns the inner pages as they are
    /// right before unmapping.
    #[cfg(test)]
    pub(crate) fn destroy_and_read_back_for_test(mut self) -> (Result<(), BufferError>, Vec<u8>) {
        let result = self.wipe_and_verify();

        if self.protection != Protection::ReadWrite {
            return (result, Vec::new());
        }

        // Safety: wipe_and_verify left the whole mapping read-write.
        let inner = unsafe { self.pages.slice(self.page, self.inner_len) }.to_vec();
        (result, inner)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_canary_for_test(&mut self) {
        // Safety: tests call this while the region is read-write.
        unsafe { self.pages.slice_mut(self.page + self.canary.len() - 1, 1)[0] ^= 0xFF };
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        wipe(&mut self.canary);
    }
}

impl core::fmt::Debug for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Region")
            .field("len", &self.len)
            .field("protection", &self.protection)
            .finish_non_exhaustive()
    }
}
