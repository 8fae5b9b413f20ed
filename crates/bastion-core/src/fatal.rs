// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Purge-and-terminate path for fatal conditions.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use parking_lot::RwLock;

use bastion_buffer::registry;

use crate::error::FatalError;

type Hook = Box<dyn Fn(FatalError) + Send + Sync>;

static HOOK: RwLock<Option<Hook>> = parking_lot::const_rwlock(None);

/// Per-buffer wait during a fatal purge. A buffer whose lock is held longer
/// (for instance by the very thread that is terminating) is skipped rather
/// than deadlocking the shutdown; its pages are still locked and excluded
/// from core dumps.
const FATAL_LOCK_WAIT: Duration = Duration::from_millis(100);

/// Installs the hook run by [`terminate`] after the purge, replacing any
/// previous one.
///
/// The hook may log, flush, or exit with a code of its choosing. If it
/// returns (or panics), the process aborts. The purge itself always runs
/// first and cannot be skipped.
pub fn set_panic_hook(hook: impl Fn(FatalError) + Send + Sync + 'static) {
    *HOOK.write() = Some(Box::new(hook));
}

/// Wipes every live buffer, including the coffer shares, runs the panic
/// hook and aborts.
pub fn terminate(error: FatalError) -> ! {
    tracing::error!(%error, code = error as u8, "fatal secure-memory error, purging");

    let report = registry::purge(Some(FATAL_LOCK_WAIT));
    if !report.is_clean() {
        tracing::error!(
            destroyed = report.destroyed,
            skipped = report.skipped,
            faults = report.faults.len(),
            "purge incomplete"
        );
    }

    let hook = HOOK.try_read_for(FATAL_LOCK_WAIT);
    if let Some(hook) = hook.as_deref().and_then(Option::as_ref) {
        let _ = catch_unwind(AssertUnwindSafe(|| hook(error)));
    }

    std::process::abort()
}
