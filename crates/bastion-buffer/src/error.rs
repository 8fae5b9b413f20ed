// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for bastion-buffer.

use bastion_rand::EntropyError;
use thiserror::Error;

/// Errors from page syscalls.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum PageError {
    /// `mmap` refused the mapping.
    #[error("mmap failed")]
    Create = 1,

    /// `mlock` refused to pin the mapping.
    #[error("mlock failed")]
    Lock = 2,

    /// `mprotect` refused a protection change.
    #[error("mprotect failed")]
    Protect = 3,

    /// `madvise` refused to exclude the mapping from core dumps.
    #[error("madvise(MADV_DONTDUMP) failed")]
    Madvise = 4,

    /// The requested size is zero, not page aligned, or overflows.
    #[error("invalid mapping size")]
    Size = 5,

    /// The platform has no lockable, protectable memory.
    #[error("secure memory is not supported on this platform")]
    Unsupported = 6,
}

/// Errors that can occur when working with buffers.
///
/// Most variants are recoverable. [`BufferError::CanaryMismatch`] and
/// [`BufferError::Protection`] are not: they mean the safety contract of the
/// memory can no longer be upheld. See [`BufferError::is_fatal`].
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum BufferError {
    /// A buffer of zero bytes was requested.
    #[error("buffer size must be greater than zero")]
    InvalidSize,

    /// The buffer has been destroyed.
    #[error("buffer has been destroyed")]
    Expired,

    /// The buffer is frozen and rejects writes.
    #[error("buffer is immutable")]
    Immutable,

    /// The memory is currently set to no-access.
    #[error("buffer memory is not accessible")]
    NoAccess,

    /// A write would cross the end of the buffer.
    #[error("write of {len} bytes at offset {offset} exceeds buffer of {capacity} bytes")]
    OutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Requested write length.
        len: usize,
        /// Usable buffer length.
        capacity: usize,
    },

    /// The secure allocator could not provide memory.
    #[error("allocation failed: {0}")]
    Alloc(PageError),

    /// No randomness for the canary or a scramble.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// The canary in front of the data changed.
    #[error("canary mismatch: memory corruption detected")]
    CanaryMismatch,

    /// Page protection could not be changed.
    #[error("protection change failed: {0}")]
    Protection(PageError),
}

impl BufferError {
    /// Returns true for conditions that imply the secure memory can no
    /// longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CanaryMismatch | Self::Protection(_))
    }
}
