// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::time::Duration;

use bastion_buffer::registry::{self, PurgeReport};

use crate::error::Error;
use crate::key;

/// How long [`purge`] waits for each buffer's exclusive lock.
pub const PURGE_LOCK_WAIT: Duration = Duration::from_secs(1);

/// Destroys every live buffer in the process, then replaces the global
/// coffer with one holding a fresh key.
///
/// Buffers held elsewhere become expired; enclaves sealed before the purge
/// can no longer be opened. A buffer whose lock is still held after
/// [`PURGE_LOCK_WAIT`] (for instance by a view alive on the calling thread)
/// is left alone and counted in [`PurgeReport::skipped`].
///
/// # Errors
///
/// - [`Error::Fatal`] if a destroyed buffer showed corruption (every buffer
///   is still wiped first)
/// - Errors creating the replacement coffer
pub fn purge() -> Result<PurgeReport, Error> {
    let report = registry::purge(Some(PURGE_LOCK_WAIT));

    tracing::debug!(
        destroyed = report.destroyed,
        skipped = report.skipped,
        "purged live buffers"
    );

    key::replace()?;

    if let Some(fault) = report.faults.first() {
        return Err((*fault).into());
    }

    Ok(report)
}
