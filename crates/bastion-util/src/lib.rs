// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Byte-level helpers shared by the bastion crates.
//!
//! Everything here operates on plain slices. None of these functions allocate,
//! and the wiping primitives are guaranteed not to be elided by the optimizer.

#![no_std]

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Overwrites every byte of `slice` with zero.
///
/// Uses volatile writes followed by a compiler fence, so the store survives
/// even when the slice is never read again.
///
/// # Example
///
/// ```
/// use bastion_util::{is_slice_zeroized, wipe};
///
/// let mut secret = *b"hunter2";
/// wipe(&mut secret);
/// assert!(is_slice_zeroized(&secret));
/// ```
#[inline]
pub fn wipe(slice: &mut [u8]) {
    slice.zeroize();
}

/// Fills a byte slice with a repeating pattern byte.
#[inline]
pub fn fill_bytes_with_pattern(slice: &mut [u8], pattern: u8) {
    for byte in slice.iter_mut() {
        *byte = pattern;
    }
}

/// Returns true if every byte in `slice` is zero.
#[inline(always)]
pub fn is_slice_zeroized(slice: &[u8]) -> bool {
    slice.iter().all(|&b| b == 0)
}

/// Constant-time equality comparison for byte slices.
///
/// Slices of different length compare unequal. For equal lengths the running
/// time does not depend on where (or whether) the contents differ.
///
/// ```
/// use bastion_util::constant_time_eq;
///
/// assert!(constant_time_eq(b"abcd", b"abcd"));
/// assert!(!constant_time_eq(b"abcd", b"abce"));
/// ```
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Writes `a ^ b` into `out`.
///
/// Only the common prefix of the three slices is written. Returns the number
/// of bytes written.
#[inline]
pub fn xor_into(a: &[u8], b: &[u8], out: &mut [u8]) -> usize {
    let n = out.len().min(a.len()).min(b.len());

    for ((o, x), y) in out[..n].iter_mut().zip(a).zip(b) {
        *o = x ^ y;
    }

    n
}
