// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The process-wide current coffer.
//!
//! Readers take a lock-free snapshot (`Arc<Coffer>`); [`rekey`] publishes a
//! fully built replacement. A superseded coffer is wiped when its last
//! snapshot is dropped, not before, so an operation already holding it
//! finishes against a consistent key.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::coffer::Coffer;
use crate::error::Error;
use crate::runtime;

static CURRENT: OnceLock<ArcSwap<Coffer>> = OnceLock::new();

/// Creates the global coffer if it does not exist yet.
pub(crate) fn install() -> Result<&'static ArcSwap<Coffer>, Error> {
    if let Some(handle) = CURRENT.get() {
        return Ok(handle);
    }

    // Losing a race drops (and wipes) this coffer.
    let coffer = Coffer::new()?;
    Ok(CURRENT.get_or_init(|| ArcSwap::from_pointee(coffer)))
}

/// Publishes a coffer with a fresh key if the global one exists.
pub(crate) fn replace() -> Result<bool, Error> {
    let Some(handle) = CURRENT.get() else {
        return Ok(false);
    };

    handle.store(Arc::new(Coffer::new()?));
    tracing::debug!("global coffer replaced");

    Ok(true)
}

/// Snapshot of the current coffer. Starts the runtime with the default
/// configuration on first use.
pub fn current() -> Result<Arc<Coffer>, Error> {
    runtime::ensure_started()?;
    Ok(install()?.load_full())
}

/// Re-masks the current coffer's shares. The key does not change.
pub fn rotate() -> Result<(), Error> {
    current()?.rotate()
}

/// Replaces the current coffer with one holding a fresh key.
///
/// Enclaves sealed before this call can no longer be opened; they fail
/// with [`Error::Authentication`].
pub fn rekey() -> Result<(), Error> {
    runtime::ensure_started()?;
    install()?;
    replace()?;
    Ok(())
}
