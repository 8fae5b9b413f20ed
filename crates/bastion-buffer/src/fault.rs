// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Fatal errors raised inside `Drop`, where nothing can be returned.

use std::sync::OnceLock;

use crate::error::BufferError;

static HANDLER: OnceLock<fn(BufferError)> = OnceLock::new();

/// Installs the handler for fatal errors detected while a [`Buffer`] is
/// dropped. Only the first installation takes effect.
///
/// Without a handler, such errors abort the process. The memory itself has
/// already been wiped by the time the handler runs.
///
/// [`Buffer`]: crate::Buffer
pub fn set_drop_fault_handler(handler: fn(BufferError)) -> bool {
    HANDLER.set(handler).is_ok()
}

pub(crate) fn raise(error: BufferError) {
    match HANDLER.get() {
        Some(handler) => handler(error),
        None => {
            tracing::error!(%error, "fatal error while dropping secure buffer");
            std::process::abort();
        }
    }
}
