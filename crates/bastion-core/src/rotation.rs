// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Rotator - runs a task on a fixed interval in a background thread.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

#[derive(Default)]
struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Background thread calling a task every `interval`.
///
/// A tick that is still running when the next one is due simply delays it.
/// Dropping the rotator stops it.
pub struct Rotator {
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Rotator {
    /// Spawns the thread. The first tick happens one `interval` from now.
    pub fn start<F>(interval: Duration, task: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = std::thread::Builder::new()
            .name("bastion-rotator".into())
            .spawn(move || run(&thread_signal, interval, task))?;

        tracing::debug!(interval_ms = interval.as_millis() as u64, "rotator started");

        Ok(Self {
            signal,
            handle: Some(handle),
            interval,
        })
    }

    /// Interval between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true until [`Rotator::stop`] has been called.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the thread and waits for it. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();

        if handle.join().is_err() {
            tracing::warn!("rotator thread panicked");
        }

        tracing::debug!("rotator stopped");
    }
}

fn run<F: Fn()>(signal: &Signal, interval: Duration, task: F) {
    let mut stopped = signal.stopped.lock();

    while !*stopped {
        if signal.wake.wait_for(&mut stopped, interval).timed_out() && !*stopped {
            MutexGuard::unlocked(&mut stopped, &task);
        }
    }
}

impl Drop for Rotator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for Rotator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rotator")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
