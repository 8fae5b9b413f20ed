// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use bastion_util::is_slice_zeroized;

use crate::consts::{KEY_LEN, NONCE_LEN, OVERHEAD, TAG_LEN};
use crate::error::CryptoError;
use crate::xchacha::{ciphertext_len, encrypt, plaintext_len};

#[test]
fn test_overhead() {
    assert_eq!(OVERHEAD, 40);
    assert_eq!(NONCE_LEN + TAG_LEN, OVERHEAD);
    assert_eq!(ciphertext_len(0), Some(40));
    assert_eq!(ciphertext_len(usize::MAX), None);
    assert_eq!(plaintext_len(40), Some(0));
    assert_eq!(plaintext_len(39), None);
}

#[test]
fn test_encrypt_layout_and_wipe() {
    let key = [3u8; KEY_LEN];
    let mut plaintext = [0x5Au8; 100];

    let ciphertext = encrypt(&mut plaintext, &key).expect("Failed to encrypt(..)");

    assert_eq!(ciphertext.len(), 100 + OVERHEAD);
    assert!(is_slice_zeroized(&plaintext));
    assert_ne!(&ciphertext[NONCE_LEN..NONCE_LEN + 100], &[0x5Au8; 100][..]);
}

#[test]
fn test_encrypt_empty_plaintext() {
    let key = [3u8; KEY_LEN];
    let ciphertext = encrypt(&mut [0u8; 0], &key).expect("Failed to encrypt(..)");
    assert_eq!(ciphertext.len(), OVERHEAD);
}

#[test]
fn test_encrypt_uses_fresh_nonce() {
    let key = [3u8; KEY_LEN];

    let a = encrypt(&mut [1u8; 16], &key).expect("Failed to encrypt(..)");
    let b = encrypt(&mut [1u8; 16], &key).expect("Failed to encrypt(..)");

    assert_ne!(&a[..NONCE_LEN], &b[..NONCE_LEN]);
    assert_ne!(a, b);
}

#[test]
fn test_encrypt_rejects_bad_key_and_still_wipes() {
    let mut plaintext = [9u8; 8];

    assert_eq!(
        encrypt(&mut plaintext, &[0u8; 16]),
        Err(CryptoError::InvalidKeyLength(16))
    );
    assert!(is_slice_zeroized(&plaintext));
}
