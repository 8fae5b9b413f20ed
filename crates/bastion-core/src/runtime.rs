// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! One-time process setup: drop-fault handler, core-dump suppression,
//! global coffer and the rotation thread.

use std::sync::OnceLock;

use parking_lot::Mutex;

use bastion_buffer::BufferError;

use crate::config::{Config, ConfigError};
use crate::error::Error;
use crate::fatal::terminate;
use crate::key;
use crate::rotation::Rotator;

struct Runtime {
    config: Config,
    _rotator: Rotator,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static STARTING: Mutex<()> = parking_lot::const_mutex(());

/// Starts the runtime with `config`.
///
/// # Errors
///
/// - [`Error::AlreadyInitialized`] if the runtime is already running,
///   whether from an earlier `init` or from lazy startup on first use
/// - [`Error::Config`] for a zero rotation interval
pub fn init(config: Config) -> Result<(), Error> {
    let _starting = STARTING.lock();

    if RUNTIME.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }

    start(config)
}

/// Starts the runtime with [`Config::default`] unless it is running.
pub fn ensure_started() -> Result<(), Error> {
    if RUNTIME.get().is_some() {
        return Ok(());
    }

    let _starting = STARTING.lock();

    if RUNTIME.get().is_some() {
        return Ok(());
    }

    start(Config::default())
}

/// Returns true once the runtime is running.
pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

/// Configuration the runtime was started with.
pub fn config() -> Option<Config> {
    RUNTIME.get().map(|runtime| runtime.config)
}

fn start(config: Config) -> Result<(), Error> {
    if config.rotation_interval.is_zero() {
        return Err(ConfigError::InvalidRotationInterval("0".into()).into());
    }

    bastion_buffer::set_drop_fault_handler(on_drop_fault);

    if config.disable_core_dumps {
        let status = bastion_guard::disable_core_dumps();
        if !status.is_protected() {
            tracing::warn!(?status, "could not disable core dumps");
        }
    }

    key::install()?;

    let rotator = Rotator::start(config.rotation_interval, rotate_current)
        .map_err(|e| Error::Rotator(e.kind()))?;

    let _ = RUNTIME.set(Runtime {
        config,
        _rotator: rotator,
    });

    tracing::debug!(?config, "runtime started");
    Ok(())
}

fn rotate_current() {
    let Ok(coffer) = key::install().map(|handle| handle.load_full()) else {
        return;
    };

    match coffer.rotate() {
        Ok(()) => {}
        Err(Error::Fatal(fatal)) => terminate(fatal),
        Err(error) => tracing::warn!(%error, "coffer rotation skipped"),
    }
}

/// Buffers dropped with a corrupted canary have nobody to return an error
/// to.
fn on_drop_fault(error: BufferError) {
    match Error::from(error) {
        Error::Fatal(fatal) => terminate(fatal),
        other => tracing::warn!(error = %other, "unexpected error while dropping buffer"),
    }
}
