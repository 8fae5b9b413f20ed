// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process-wide registry of live buffers, so they can all be wiped at once.
//!
//! Entries are weak: the registry never keeps a buffer alive, and a dropped
//! buffer's slot is reclaimed lazily.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::Shared;
use crate::error::BufferError;

static LIVE: Mutex<Vec<Weak<Shared>>> = parking_lot::const_mutex(Vec::new());

pub(crate) fn register(shared: &Arc<Shared>) {
    let mut live = LIVE.lock();

    if live.len() == live.capacity() {
        live.retain(|entry| entry.strong_count() > 0);
    }

    live.push(Arc::downgrade(shared));
}

/// Outcome of [`purge`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Buffers destroyed by this purge.
    pub destroyed: usize,
    /// Buffers left alone because their lock could not be taken in time.
    pub skipped: usize,
    /// Fatal conditions found while destroying (the memory was still wiped).
    pub faults: Vec<BufferError>,
}

impl PurgeReport {
    /// True if every buffer was destroyed without finding corruption.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.faults.is_empty()
    }
}

/// Number of registered buffers that are still alive.
pub fn live_count() -> usize {
    LIVE.lock()
        .iter()
        .filter_map(Weak::upgrade)
        .filter(|shared| shared.is_alive())
        .count()
}

/// Destroys every live buffer in the process.
///
/// With `lock_wait = None` each buffer's exclusive lock is awaited
/// indefinitely. With `Some(timeout)` a buffer whose lock cannot be taken
/// within `timeout` is skipped and counted in [`PurgeReport::skipped`].
pub fn purge(lock_wait: Option<Duration>) -> PurgeReport {
    let snapshot: Vec<Arc<Shared>> = {
        let mut live = LIVE.lock();
        live.retain(|entry| entry.strong_count() > 0);
        live.iter().filter_map(Weak::upgrade).collect()
    };

    let mut report = PurgeReport::default();

    for shared in snapshot {
        let outcome = match lock_wait {
            None => Some(shared.destroy()),
            Some(timeout) => shared.try_destroy_for(timeout),
        };

        match outcome {
            Some(Ok(true)) => report.destroyed += 1,
            Some(Ok(false)) => {}
            Some(Err(fault)) => {
                report.destroyed += 1;
                report.faults.push(fault);
            }
            None => {
                tracing::warn!("purge skipped a buffer whose lock is held");
                report.skipped += 1;
            }
        }
    }

    report
}
