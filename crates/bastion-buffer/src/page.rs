// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Pages - the secure allocator.
//!
//! Wraps an anonymous mapping with mlock/madvise/mprotect. Sizes and offsets
//! passed to [`Pages`] are whole pages; sub-page layout is the caller's job.

use core::ptr::NonNull;
use std::sync::OnceLock;

use crate::error::PageError;

/// Access protection of a range of pages.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Protection {
    /// Any access faults.
    NoAccess,
    /// Reads allowed, writes fault.
    ReadOnly,
    /// Reads and writes allowed.
    ReadWrite,
}

impl Protection {
    /// Returns true if the range can be read.
    pub fn is_readable(self) -> bool {
        !matches!(self, Self::NoAccess)
    }

    /// Returns true if the range can be written.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Returns the system page size.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(sys::page_size)
}

/// Rounds `len` up to a multiple of the page size.
///
/// Returns `None` on overflow.
pub fn round_to_pages(len: usize) -> Option<usize> {
    let page = page_size();
    len.checked_add(page - 1).map(|n| n / page * page)
}

/// A locked, dump-excluded, page-aligned mapping.
///
/// Starts out read-write and zero filled. On drop the whole mapping is made
/// writable, wiped, unlocked and unmapped.
pub struct Pages {
    ptr: NonNull<u8>,
    len: usize,
}

// Safety: Pages owns its mapping; aliasing is controlled through &self/&mut self.
unsafe impl Send for Pages {}
unsafe impl Sync for Pages {}

impl Pages {
    /// Maps and locks `len` bytes. `len` must be a non-zero multiple of the
    /// page size.
    pub fn reserve(len: usize) -> Result<Self, PageError> {
        if len == 0 || len % page_size() != 0 {
            return Err(PageError::Size);
        }

        let ptr = sys::map(len)?;

        if let Err(e) = sys::lock(ptr, len) {
            sys::unmap(ptr, len);
            return Err(e);
        }

        if let Err(e) = sys::exclude_from_dumps(ptr, len) {
            sys::unlock(ptr, len);
            sys::unmap(ptr, len);
            return Err(e);
        }

        Ok(Self { ptr, len })
    }

    /// Total mapped length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a mapping is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Changes protection of `len` bytes starting at `offset`. Both must be
    /// page aligned and inside the mapping.
    pub fn protect(&self, offset: usize, len: usize, protection: Protection) -> Result<(), PageError> {
        self.check_range(offset, len)?;

        if offset % page_size() != 0 || len % page_size() != 0 {
            return Err(PageError::Size);
        }

        // Safety: range checked above.
        let start = unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) };
        sys::protect(start, len, protection)
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Safety
    /// The range must be readable, otherwise the access faults.
    pub unsafe fn slice(&self, offset: usize, len: usize) -> &[u8] {
        debug_assert!(self.check_range(offset, len).is_ok());
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr().add(offset), len) }
    }

    /// Returns `len` bytes starting at `offset`, mutably.
    ///
    /// # Safety
    /// The range must be writable, otherwise the access faults.
    pub unsafe fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(self.check_range(offset, len).is_ok());
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr().add(offset), len) }
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<(), PageError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(PageError::Size),
        }
    }
}

impl Drop for Pages {
    fn drop(&mut self) {
        // If the mapping cannot be made writable it stays protected, which
        // keeps the contents unreadable until unmap.
        if sys::protect(self.ptr, self.len, Protection::ReadWrite).is_ok() {
            // Safety: the whole mapping is read-write now.
            bastion_util::wipe(unsafe { self.slice_mut(0, self.len) });
        }

        sys::include_in_dumps(self.ptr, self.len);
        sys::unlock(self.ptr, self.len);
        sys::unmap(self.ptr, self.len);
    }
}

impl core::fmt::Debug for Pages {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pages")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
mod sys {
    use core::ptr::{self, NonNull};

    use super::Protection;
    use crate::error::PageError;

    pub fn page_size() -> usize {
        unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
    }

    pub fn map(len: usize) -> Result<NonNull<u8>, PageError> {
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(PageError::Create);
        }

        NonNull::new(ptr as *mut u8).ok_or(PageError::Create)
    }

    pub fn lock(ptr: NonNull<u8>, len: usize) -> Result<(), PageError> {
        match unsafe { libc::mlock(ptr.as_ptr() as *const _, len) } {
            0 => Ok(()),
            _ => Err(PageError::Lock),
        }
    }

    pub fn unlock(ptr: NonNull<u8>, len: usize) {
        unsafe { libc::munlock(ptr.as_ptr() as *const _, len) };
    }

    pub fn unmap(ptr: NonNull<u8>, len: usize) {
        unsafe { libc::munmap(ptr.as_ptr() as *mut _, len) };
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn exclude_from_dumps(ptr: NonNull<u8>, len: usize) -> Result<(), PageError> {
        match unsafe { libc::madvise(ptr.as_ptr() as *mut _, len, libc::MADV_DONTDUMP) } {
            0 => Ok(()),
            _ => Err(PageError::Madvise),
        }
    }

    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    pub fn exclude_from_dumps(ptr: NonNull<u8>, len: usize) -> Result<(), PageError> {
        match unsafe { libc::madvise(ptr.as_ptr() as *mut _, len, libc::MADV_NOCORE) } {
            0 => Ok(()),
            _ => Err(PageError::Madvise),
        }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "dragonfly"
    )))]
    pub fn exclude_from_dumps(_ptr: NonNull<u8>, _len: usize) -> Result<(), PageError> {
        Ok(())
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn include_in_dumps(ptr: NonNull<u8>, len: usize) {
        unsafe { libc::madvise(ptr.as_ptr() as *mut _, len, libc::MADV_DODUMP) };
    }

    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    pub fn include_in_dumps(ptr: NonNull<u8>, len: usize) {
        unsafe { libc::madvise(ptr.as_ptr() as *mut _, len, libc::MADV_CORE) };
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "dragonfly"
    )))]
    pub fn include_in_dumps(_ptr: NonNull<u8>, _len: usize) {}

    pub fn protect(ptr: NonNull<u8>, len: usize, protection: Protection) -> Result<(), PageError> {
        let prot = match protection {
            Protection::NoAccess => libc::PROT_NONE,
            Protection::ReadOnly => libc::PROT_READ,
            Protection::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        };

        match unsafe { libc::mprotect(ptr.as_ptr() as *mut _, len, prot) } {
            0 => Ok(()),
            _ => Err(PageError::Protect),
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use core::ptr::NonNull;

    use super::Protection;
    use crate::error::PageError;

    pub fn page_size() -> usize {
        4096
    }

    pub fn map(_len: usize) -> Result<NonNull<u8>, PageError> {
        Err(PageError::Unsupported)
    }

    pub fn lock(_ptr: NonNull<u8>, _len: usize) -> Result<(), PageError> {
        Err(PageError::Unsupported)
    }

    pub fn unlock(_ptr: NonNull<u8>, _len: usize) {}

    pub fn unmap(_ptr: NonNull<u8>, _len: usize) {}

    pub fn exclude_from_dumps(_ptr: NonNull<u8>, _len: usize) -> Result<(), PageError> {
        Err(PageError::Unsupported)
    }

    pub fn include_in_dumps(_ptr: NonNull<u8>, _len: usize) {}

    pub fn protect(_ptr: NonNull<u8>, _len: usize, _protection: Protection) -> Result<(), PageError> {
        Err(PageError::Unsupported)
    }
}
