// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::sync::Arc;

use bastion_aead::KEY_LEN;
use bastion_util::is_slice_zeroized;

use crate::coffer::Coffer;
use crate::error::Error;

fn key_of(coffer: &Coffer) -> Vec<u8> {
    let view = coffer.view().expect("Failed to view()");
    let key = view.data().expect("Failed to data()").to_vec();
    view.destroy().expect("Failed to destroy()");
    key
}

#[test]
fn test_new_holds_random_key() {
    let a = key_of(&Coffer::new().expect("Failed to new()"));
    let b = key_of(&Coffer::new().expect("Failed to new()"));

    assert_eq!(a.len(), KEY_LEN);
    assert!(!is_slice_zeroized(&a));
    assert_ne!(a, b);
}

#[test]
fn test_shares_xor_to_key() {
    let coffer = Coffer::new().expect("Failed to new()");
    let key = key_of(&coffer);
    let (left, right) = coffer.shares_for_test().expect("Failed to shares_for_test()");

    let xored: Vec<u8> = left.iter().zip(&right).map(|(l, r)| l ^ r).collect();
    assert_eq!(xored, key);
    assert_ne!(left, key);
    assert_ne!(right, key);
}

#[test]
fn test_view_is_fresh_mutable_buffer() {
    let coffer = Coffer::new().expect("Failed to new()");

    let a = coffer.view().expect("Failed to view()");
    let b = coffer.view().expect("Failed to view()");

    assert!(a.is_mutable());
    assert_eq!(a.len(), KEY_LEN);
    assert_eq!(a.equal(&b.data().expect("Failed to data()")), Ok(true));

    // Destroying one view leaves the coffer and other views alone.
    a.destroy().expect("Failed to destroy()");
    assert!(b.alive());
    assert!(!coffer.destroyed());
}

#[test]
fn test_rotate_keeps_key_and_replaces_shares() {
    let coffer = Coffer::new().expect("Failed to new()");
    let key = key_of(&coffer);
    let (left, right) = coffer.shares_for_test().expect("Failed to shares_for_test()");

    coffer.rotate().expect("Failed to rotate()");

    let (new_left, new_right) = coffer.shares_for_test().expect("Failed to shares_for_test()");
    assert_ne!(left, new_left);
    assert_ne!(right, new_right);
    assert_eq!(key_of(&coffer), key);
}

#[test]
fn test_destroy() {
    let coffer = Coffer::new().expect("Failed to new()");
    assert!(!coffer.destroyed());

    coffer.destroy().expect("Failed to destroy()");
    coffer.destroy().expect("Failed to destroy()");

    assert!(coffer.destroyed());
    assert_eq!(coffer.view().err(), Some(Error::CofferDestroyed));
    assert_eq!(coffer.rotate(), Err(Error::CofferDestroyed));
    assert!(coffer.shares_for_test().is_none());
}

#[test]
fn test_concurrent_views_during_rotation() {
    let coffer = Arc::new(Coffer::new().expect("Failed to new()"));
    let key = key_of(&coffer);

    let rotator = {
        let coffer = Arc::clone(&coffer);
        std::thread::spawn(move || {
            for _ in 0..200 {
                coffer.rotate().expect("Failed to rotate()");
            }
        })
    };

    let viewers: Vec<_> = (0..4)
        .map(|_| {
            let coffer = Arc::clone(&coffer);
            let key = key.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    assert_eq!(key_of(&coffer), key);
                }
            })
        })
        .collect();

    rotator.join().expect("Failed to join rotator");
    for viewer in viewers {
        viewer.join().expect("Failed to join viewer");
    }
}

#[test]
fn test_racing_rotations_keep_key_and_never_revive() {
    let coffer = Arc::new(Coffer::new().expect("Failed to new()"));
    let key = key_of(&coffer);

    let rotators: Vec<_> = (0..4)
        .map(|_| {
            let coffer = Arc::clone(&coffer);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    match coffer.rotate() {
                        Ok(()) | Err(Error::CofferDestroyed) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    for _ in 0..20 {
        assert_eq!(key_of(&coffer), key);
    }
    coffer.destroy().expect("Failed to destroy()");

    for rotator in rotators {
        rotator.join().expect("Failed to join rotator");
    }

    // A rotation prepared before the destroy must not bring shares back.
    assert!(coffer.destroyed());
    assert!(coffer.shares_for_test().is_none());
}

#[test]
fn test_debug_hides_key() {
    let coffer = Coffer::new().expect("Failed to new()");
    assert_eq!(format!("{coffer:?}"), "Coffer { destroyed: false, .. }");
}
