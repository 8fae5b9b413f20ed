// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

#[cfg(unix)]
mod coffer;

#[cfg(unix)]
use bastion_buffer::Buffer;

/// Runs an ignored test as a subprocess and returns its exit code
/// (`None` when the child was killed by a signal, including abort).
#[cfg(unix)]
pub(crate) fn run_test_as_subprocess(test_name: &str) -> Option<i32> {
    let exe = std::env::current_exe().expect("Failed to get current exe");
    let status = std::process::Command::new(exe)
        .args([
            "--exact",
            test_name,
            "--ignored",
            "--test-threads=1",
            "--nocapture",
        ])
        .status()
        .expect("Failed to run subprocess");
    status.code()
}

#[cfg(unix)]
/// Simulates an underflowing write into the canary in front of the data.
pub(crate) fn corrupt_canary(buffer: &Buffer) {
    let _ = buffer.open_mut(|data| {
        // Safety: the canary occupies at least CANARY_LEN bytes right
        // before the data, inside the same read-write pages.
        unsafe { *data.as_mut_ptr().sub(1) ^= 0xFF };
    });
}
