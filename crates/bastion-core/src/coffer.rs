// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Coffer - a session key stored as two XOR shares.
//!
//! `left` is uniformly random and `right = key ^ left`, each in its own
//! guarded buffer, frozen between uses. A memory snapshot holding only one
//! of them reveals nothing about the key.
//!
//! Rotation XORs a fresh random mask into both shares:
//! `(left ^ m) ^ (right ^ m) == left ^ right`, so the key is unchanged while
//! every byte of its stored representation is replaced. The new pair is
//! built in full before it replaces the old one, under the same lock that
//! [`Coffer::view`] takes, so a view never sees one old and one new share.
//! Allocation and release happen outside that lock.

use parking_lot::Mutex;

use bastion_aead::KEY_LEN;
use bastion_buffer::{Buffer, BufferError};
use bastion_util::xor_into;

use crate::error::Error;

struct Shares {
    left: Buffer,
    right: Buffer,
}

impl Shares {
    /// Splits `key` against a fresh random mask.
    fn split(key: &[u8]) -> Result<Self, Error> {
        let left = Buffer::random(KEY_LEN)?;
        let right = Buffer::new(KEY_LEN)?;

        {
            let mask = left.data()?;
            right.open_mut(|out| xor_into(key, &mask, out))?;
        }

        left.freeze()?;
        right.freeze()?;

        Ok(Self { left, right })
    }

    fn reconstruct_into(&self, out: &Buffer) -> Result<(), Error> {
        let left = self.left.data().map_err(share_error)?;
        let right = self.right.data().map_err(share_error)?;

        out.open_mut(|out| xor_into(&left, &right, out))?;
        Ok(())
    }

    fn alive(&self) -> bool {
        self.left.alive() && self.right.alive()
    }

    /// Destroys both shares, reporting a fatal condition over anything else.
    fn destroy(&self) -> Result<(), Error> {
        let left = self.left.destroy();
        let right = self.right.destroy();
        left.and(right)?;
        Ok(())
    }
}

/// Buffers for one rotation, allocated before the coffer lock is taken so
/// the critical section is only the XOR and two protection changes.
struct Remask {
    mask: Buffer,
    left: Buffer,
    right: Buffer,
}

impl Remask {
    fn prepare() -> Result<Self, Error> {
        Ok(Self {
            mask: Buffer::random(KEY_LEN)?,
            left: Buffer::new(KEY_LEN)?,
            right: Buffer::new(KEY_LEN)?,
        })
    }

    /// Same key, fresh representation. Returns the new shares and the spent
    /// mask, which the caller destroys after releasing the lock.
    fn apply(self, old: &Shares) -> Result<(Shares, Buffer), Error> {
        {
            let mask = self.mask.data()?;
            let old_left = old.left.data().map_err(share_error)?;
            let old_right = old.right.data().map_err(share_error)?;

            self.left.open_mut(|out| xor_into(&old_left, &mask, out))?;
            self.right.open_mut(|out| xor_into(&old_right, &mask, out))?;
        }

        self.left.freeze()?;
        self.right.freeze()?;

        let shares = Shares {
            left: self.left,
            right: self.right,
        };
        Ok((shares, self.mask))
    }
}

/// A share destroyed behind the coffer's back (by a purge) means the coffer
/// is gone.
fn share_error(error: BufferError) -> Error {
    match error {
        BufferError::Expired => Error::CofferDestroyed,
        other => other.into(),
    }
}

/// Holder of one 32-byte session key, never stored unsplit.
///
/// Dropping a coffer destroys its shares.
pub struct Coffer {
    shares: Mutex<Option<Shares>>,
}

impl Coffer {
    /// Creates a coffer holding a fresh random key.
    pub fn new() -> Result<Self, Error> {
        let key = Buffer::random(KEY_LEN)?;

        let shares = {
            let view = key.data()?;
            Shares::split(&view)?
        };
        key.destroy()?;

        tracing::debug!("coffer created");

        Ok(Self {
            shares: Mutex::new(Some(shares)),
        })
    }

    /// Reconstructs the key into a new, mutable buffer.
    ///
    /// The coffer keeps no reference to the returned buffer. Destroy it as
    /// soon as the key has been used.
    ///
    /// # Errors
    ///
    /// - [`Error::CofferDestroyed`] if the shares are gone
    pub fn view(&self) -> Result<Buffer, Error> {
        let out = Buffer::new(KEY_LEN)?;

        let guard = self.shares.lock();
        let shares = guard.as_ref().ok_or(Error::CofferDestroyed)?;
        shares.reconstruct_into(&out)?;

        Ok(out)
    }

    /// Replaces both shares with a freshly masked pair for the same key.
    ///
    /// On error the previous shares stay in place.
    pub fn rotate(&self) -> Result<(), Error> {
        let remask = Remask::prepare()?;

        let (old, mask) = {
            let mut guard = self.shares.lock();
            let current = guard.as_ref().ok_or(Error::CofferDestroyed)?;
            let (fresh, mask) = remask.apply(current)?;
            (guard.replace(fresh), mask)
        };

        mask.destroy()?;
        if let Some(old) = old {
            old.destroy()?;
        }

        tracing::debug!("coffer shares rotated");
        Ok(())
    }

    /// Wipes both shares. Idempotent.
    pub fn destroy(&self) -> Result<(), Error> {
        let shares = self.shares.lock().take();

        match shares {
            Some(shares) => shares.destroy(),
            None => Ok(()),
        }
    }

    /// Returns true once the shares have been wiped, by [`Coffer::destroy`]
    /// or by a purge.
    pub fn destroyed(&self) -> bool {
        self.shares
            .lock()
            .as_ref()
            .is_none_or(|shares| !shares.alive())
    }

    #[cfg(test)]
    pub(crate) fn shares_for_test(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        let guard = self.shares.lock();
        let shares = guard.as_ref()?;
        let left = shares.left.data().ok()?.to_vec();
        let right = shares.right.data().ok()?.to_vec();
        Some((left, right))
    }
}

impl core::fmt::Debug for Coffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Coffer")
            .field("destroyed", &self.destroyed())
            .finish_non_exhaustive()
    }
}
