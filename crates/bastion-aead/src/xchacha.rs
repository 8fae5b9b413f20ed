// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use chacha20poly1305::aead::AeadInPlace;
use chacha20poly1305::{KeyInit, Tag, XChaCha20Poly1305, XNonce};

use bastion_util::wipe;

use crate::consts::{AAD, KEY_LEN, NONCE_LEN, OVERHEAD, TAG_LEN};
use crate::error::CryptoError;

/// Length of the ciphertext for a plaintext of `len` bytes.
///
/// Returns `None` on overflow.
#[inline]
pub fn ciphertext_len(len: usize) -> Option<usize> {
    len.checked_add(OVERHEAD)
}

/// Length of the plaintext inside a ciphertext of `len` bytes.
///
/// Returns `None` if `len` cannot hold a nonce and a tag.
#[inline]
pub fn plaintext_len(len: usize) -> Option<usize> {
    len.checked_sub(OVERHEAD)
}

fn cipher(key: &[u8]) -> Result<XChaCha20Poly1305, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength(key.len()));
    }

    XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(key.len()))
}

/// Encrypts `plaintext` under `key` and returns `nonce ‖ data ‖ tag`.
///
/// Encryption happens in place, so `plaintext` is wiped on return whether or
/// not sealing succeeded.
///
/// # Errors
///
/// - [`CryptoError::InvalidKeyLength`] if `key` is not 32 bytes
/// - [`CryptoError::Entropy`] if no nonce could be drawn
/// - [`CryptoError::PlaintextTooLong`] past the XChaCha20 counter limit
pub fn encrypt(plaintext: &mut [u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let result = encrypt_in_place(plaintext, key);
    wipe(plaintext);
    result
}

fn encrypt_in_place(buf: &mut [u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    bastion_rand::fill_random(&mut nonce)?;

    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(&nonce), AAD, buf)
        .map_err(|_| CryptoError::PlaintextTooLong(buf.len()))?;

    let mut out = Vec::with_capacity(buf.len().saturating_add(OVERHEAD));
    out.extend_from_slice(&nonce);
    out.extend_from_slice(buf);
    out.extend_from_slice(&tag);

    Ok(out)
}

/// Authenticates and decrypts `ciphertext` under `key` into `out`.
///
/// `out` must be exactly `ciphertext.len() - OVERHEAD` bytes. If the tag
/// does not verify, `out` is wiped before returning.
///
/// # Errors
///
/// - [`CryptoError::InvalidKeyLength`] if `key` is not 32 bytes
/// - [`CryptoError::CiphertextTooShort`] if `ciphertext` is shorter than
///   [`OVERHEAD`]
/// - [`CryptoError::OutputLength`] if `out` has the wrong length
/// - [`CryptoError::Authentication`] on a wrong key or altered ciphertext
pub fn decrypt_into(ciphertext: &[u8], key: &[u8], out: &mut [u8]) -> Result<(), CryptoError> {
    let len = plaintext_len(ciphertext.len())
        .ok_or(CryptoError::CiphertextTooShort(ciphertext.len()))?;

    if out.len() != len {
        return Err(CryptoError::OutputLength {
            expected: len,
            actual: out.len(),
        });
    }

    let cipher = cipher(key)?;

    let (nonce, rest) = ciphertext.split_at(NONCE_LEN);
    let (data, tag) = rest.split_at(len);
    debug_assert_eq!(tag.len(), TAG_LEN);

    out.copy_from_slice(data);

    if cipher
        .decrypt_in_place_detached(XNonce::from_slice(nonce), AAD, out, Tag::from_slice(tag))
        .is_err()
    {
        wipe(out);
        return Err(CryptoError::Authentication);
    }

    Ok(())
}

/// Authenticates and decrypts `ciphertext` under `key` into a new vector.
///
/// The plaintext lands on the ordinary heap. Callers holding secrets should
/// use [`decrypt_into`] with guarded memory instead.
///
/// # Errors
///
/// As [`decrypt_into`], minus the output length check.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let len = plaintext_len(ciphertext.len())
        .ok_or(CryptoError::CiphertextTooShort(ciphertext.len()))?;

    let mut out = vec![0u8; len];
    decrypt_into(ciphertext, key, &mut out)?;
    Ok(out)
}
