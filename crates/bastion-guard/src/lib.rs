// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! bastion_guard - Process-level hardening against memory disclosure
//!
//! Locked pages keep secrets out of swap, but a crash still writes the whole
//! address space to a core file. This crate switches core dumps off once per
//! process:
//!
//! - `prctl(PR_SET_DUMPABLE, 0)` (Linux): no core file, no ptrace attach by
//!   non-root peers.
//! - `setrlimit(RLIMIT_CORE, 0)` (all unix): core file size capped at zero.

#![warn(missing_docs)]


use std::sync::OnceLock;

/// Outcome of [`disable_core_dumps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardStatus {
    /// Whether the process was marked non-dumpable.
    pub not_dumpable: bool,

    /// Whether the core file size limit was set to zero.
    pub core_limit_zero: bool,
}

impl GuardStatus {
    /// Returns true if at least one protection is in place.
    pub fn is_protected(&self) -> bool {
        self.not_dumpable || self.core_limit_zero
    }
}

static STATUS: OnceLock<GuardStatus> = OnceLock::new();

/// Disables core dumps for the current process.
///
/// The syscalls run on the first call only; every later call returns the
/// cached outcome. Safe to call from many threads at once.
///
/// ```
/// let status = bastion_guard::disable_core_dumps();
/// assert_eq!(status, bastion_guard::disable_core_dumps());
/// ```
pub fn disable_core_dumps() -> GuardStatus {
    *STATUS.get_or_init(|| GuardStatus {
        not_dumpable: set_not_dumpable(),
        core_limit_zero: set_core_limit_zero(),
    })
}

/// Returns the cached outcome, or `None` if hardening was never requested.
pub fn guard_status() -> Option<GuardStatus> {
    STATUS.get().copied()
}

#[cfg(target_os = "linux")]
fn set_not_dumpable() -> bool {
    unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) == 0 }
}

#[cfg(not(target_os = "linux"))]
fn set_not_dumpable() -> bool {
    false
}

#[cfg(unix)]
fn set_core_limit_zero() -> bool {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    unsafe { libc::setrlimit(libc::RLIMIT_CORE, &limit) == 0 }
}

#[cfg(not(unix))]
fn set_core_limit_zero() -> bool {
    false
}
