// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # bastion_aead
//!
//! XChaCha20-Poly1305 with a random 24-byte nonce per message.
//!
//! Ciphertext layout:
//!
//! ```text
//! | nonce (24) | encrypted data (n) | tag (16) |
//! ```
//!
//! so a sealed message is always [`OVERHEAD`] bytes longer than its
//! plaintext.
//!
//! Both directions work in place over caller-owned memory: [`encrypt`]
//! encrypts the plaintext where it lies and wipes it, [`decrypt_into`]
//! decrypts straight into the destination and wipes it again if
//! authentication fails. The plaintext never touches an intermediate heap
//! allocation.
//!
//! ```rust
//! use bastion_aead::{KEY_LEN, OVERHEAD, decrypt_into, encrypt};
//!
//! let key = [7u8; KEY_LEN];
//! let mut plaintext = *b"attack at dawn";
//!
//! let ciphertext = encrypt(&mut plaintext, &key).expect("Failed to encrypt(..)");
//! assert_eq!(ciphertext.len(), 14 + OVERHEAD);
//! assert_eq!(plaintext, [0u8; 14]);
//!
//! let mut recovered = [0u8; 14];
//! decrypt_into(&ciphertext, &key, &mut recovered).expect("Failed to decrypt_into(..)");
//! assert_eq!(&recovered, b"attack at dawn");
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod consts;
mod error;
mod xchacha;

pub use consts::{KEY_LEN, NONCE_LEN, OVERHEAD, TAG_LEN};
pub use error::CryptoError;
pub use xchacha::{ciphertext_len, decrypt, decrypt_into, encrypt, plaintext_len};
