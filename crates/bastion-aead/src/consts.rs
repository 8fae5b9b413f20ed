// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Bytes added to a plaintext by sealing.
pub const OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Associated data bound into every tag.
pub(crate) const AAD: &[u8] = b"";
