// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Guarded memory buffers for secret material.
//!
//! # Layers
//!
//! ## Pages
//!
//! The secure allocator. Page-aligned anonymous mappings that are:
//! - locked in RAM with `mlock` (never written to swap)
//! - excluded from core dumps with `madvise`
//! - switchable between no-access, read-only and read-write with `mprotect`
//! - wiped, unlocked and unmapped on release
//!
//! Platforms without these primitives fail closed: allocation is refused.
//!
//! ## Region
//!
//! One allocation laid out as
//!
//! ```text
//! | guard page | canary ........ | data | guard page |
//!              '----- inner pages -----'
//! ```
//!
//! The data is pushed against the trailing guard page so an overflow faults
//! on the first byte past the end. A random canary fills the space in front
//! of the data and is checked on every access; a mismatch means something
//! wrote where it should not have.
//!
//! ## Buffer
//!
//! The user-facing container. Adds a lifecycle (alive/destroyed), a
//! mutability flag mapped onto page protection, and a reader/writer lock:
//! many concurrent readers, or one writer/destroyer.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(unix)]
//! # fn example() -> Result<(), bastion_buffer::BufferError> {
//! use bastion_buffer::Buffer;
//!
//! let buffer = Buffer::new(32)?;
//! buffer.write(0, b"correct horse battery staple")?;
//!
//! buffer.freeze()?;
//! assert!(buffer.write(0, b"x").is_err());
//! assert_eq!(&buffer.data()?[..7], b"correct");
//!
//! buffer.destroy()?;
//! assert!(!buffer.alive());
//! # Ok(())
//! # }
//! # #[cfg(unix)]
//! # example().expect("Failed to run example()");
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod buffer;
mod error;
mod fault;
mod page;
mod region;

pub mod registry;

pub use buffer::{Buffer, BufferView};
pub use error::{BufferError, PageError};
pub use fault::set_drop_fault_handler;
pub use page::{Pages, Protection, page_size, round_to_pages};
pub use region::{CANARY_LEN, Region};
