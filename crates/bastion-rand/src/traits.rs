// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::EntropyError;

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// Fills the destination buffer with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError::EntropyNotAvailable`] if the source cannot
    /// produce data. `dest` contents are unspecified in that case.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}
