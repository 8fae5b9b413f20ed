// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for Buffer.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use proptest::prelude::*;

use bastion_util::{fill_bytes_with_pattern, is_slice_zeroized};

use crate::buffer::Buffer;
use crate::error::BufferError;

// =============================================================================
// new()
// =============================================================================

#[test]
fn test_new_zero_is_invalid() {
    assert_eq!(Buffer::new(0).err(), Some(BufferError::InvalidSize));
}

#[test]
fn test_new_defaults() {
    let buffer = Buffer::new(32).expect("Failed to new(..)");

    assert!(buffer.alive());
    assert!(buffer.is_mutable());
    assert_eq!(buffer.len(), 32);
    assert!(!buffer.is_empty());
    assert!(is_slice_zeroized(&buffer.data().expect("Failed to data()")));
}

#[test]
fn test_from_bytes_wipes_source() {
    let mut src = [0xABu8; 20];
    let buffer = Buffer::from_bytes(&mut src).expect("Failed to from_bytes(..)");

    assert!(is_slice_zeroized(&src));
    assert_eq!(&*buffer.data().expect("Failed to data()"), &[0xABu8; 20]);
}

#[test]
fn test_from_bytes_empty_is_invalid() {
    let mut src = [0u8; 0];
    assert_eq!(
        Buffer::from_bytes(&mut src).err(),
        Some(BufferError::InvalidSize)
    );
}

#[test]
fn test_random_is_not_zeroed() {
    let buffer = Buffer::random(64).expect("Failed to random(..)");
    assert!(!is_slice_zeroized(&buffer.data().expect("Failed to data()")));
}

// =============================================================================
// write() / copy_from() / move_from()
// =============================================================================

#[test]
fn test_write_at_offset() {
    let buffer = Buffer::new(8).expect("Failed to new(..)");
    buffer.write(4, &[1, 2, 3, 4]).expect("Failed to write(..)");

    assert_eq!(
        &*buffer.data().expect("Failed to data()"),
        &[0, 0, 0, 0, 1, 2, 3, 4]
    );
}

#[test]
fn test_write_out_of_bounds() {
    let buffer = Buffer::new(8).expect("Failed to new(..)");

    assert_eq!(
        buffer.write(6, &[1, 2, 3]),
        Err(BufferError::OutOfBounds {
            offset: 6,
            len: 3,
            capacity: 8
        })
    );
    assert_eq!(
        buffer.write(usize::MAX, &[1]),
        Err(BufferError::OutOfBounds {
            offset: usize::MAX,
            len: 1,
            capacity: 8
        })
    );
    assert!(is_slice_zeroized(&buffer.data().expect("Failed to data()")));
}

#[test]
fn test_copy_from_truncates() {
    let buffer = Buffer::new(4).expect("Failed to new(..)");

    assert_eq!(buffer.copy_from(b"abcdef"), Ok(4));
    assert_eq!(&*buffer.data().expect("Failed to data()"), b"abcd");

    assert_eq!(buffer.copy_from(b"xy"), Ok(2));
    assert_eq!(&*buffer.data().expect("Failed to data()"), b"xycd");
}

#[test]
fn test_move_from_wipes_source_even_when_frozen() {
    let buffer = Buffer::new(4).expect("Failed to new(..)");
    buffer.freeze().expect("Failed to freeze()");

    let mut src = *b"key!";
    assert_eq!(buffer.move_from(&mut src), Err(BufferError::Immutable));
    assert!(is_slice_zeroized(&src));
}

// =============================================================================
// freeze() / melt()
// =============================================================================

#[test]
fn test_freeze_rejects_writes_but_allows_reads() {
    let buffer = Buffer::new(4).expect("Failed to new(..)");
    buffer.write(0, b"abcd").expect("Failed to write(..)");
    buffer.freeze().expect("Failed to freeze()");

    assert!(!buffer.is_mutable());
    assert_eq!(buffer.write(0, b"x"), Err(BufferError::Immutable));
    assert_eq!(buffer.wipe(), Err(BufferError::Immutable));
    assert_eq!(buffer.scramble(), Err(BufferError::Immutable));
    assert_eq!(&*buffer.data().expect("Failed to data()"), b"abcd");
}

#[test]
fn test_melt_restores_writes() {
    let buffer = Buffer::new(4).expect("Failed to new(..)");
    buffer.freeze().expect("Failed to freeze()");
    buffer.melt().expect("Failed to melt()");

    assert!(buffer.is_mutable());
    buffer.write(0, b"abcd").expect("Failed to write(..)");
}

#[test]
fn test_freeze_and_melt_are_idempotent() {
    let buffer = Buffer::new(4).expect("Failed to new(..)");

    buffer.melt().expect("Failed to melt()");
    buffer.freeze().expect("Failed to freeze()");
    buffer.freeze().expect("Failed to freeze()");
    assert!(!buffer.is_mutable());
}

// =============================================================================
// wipe() / equal()
// =============================================================================

#[test]
fn test_wipe_zeroes_data() {
    let buffer = Buffer::random(16).expect("Failed to random(..)");
    buffer.wipe().expect("Failed to wipe()");

    assert!(is_slice_zeroized(&buffer.data().expect("Failed to data()")));
}

#[test]
fn test_equal() {
    let buffer = Buffer::new(3).expect("Failed to new(..)");
    buffer.write(0, b"abc").expect("Failed to write(..)");

    assert_eq!(buffer.equal(b"abc"), Ok(true));
    assert_eq!(buffer.equal(b"abd"), Ok(false));
    assert_eq!(buffer.equal(b"ab"), Ok(false));
}

// =============================================================================
// destroy()
// =============================================================================

#[test]
fn test_destroy_is_idempotent() {
    let buffer = Buffer::new(16).expect("Failed to new(..)");

    buffer.destroy().expect("Failed to destroy()");
    buffer.destroy().expect("Failed to destroy()");

    assert!(!buffer.alive());
    assert_eq!(buffer.len(), 0);
    assert!(buffer.is_empty());
}

#[test]
fn test_destroy_leaves_no_plaintext() {
    for len in [1, 31, 4096, 10_000] {
        let buffer = Buffer::new(len).expect("Failed to new(..)");
        buffer
            .open_mut(|data| fill_bytes_with_pattern(data, 0x5A))
            .expect("Failed to open_mut(..)");
        buffer.freeze().expect("Failed to freeze()");

        let (result, inner) = buffer
            .destroy_and_read_back_for_test()
            .expect("Buffer was already destroyed");

        assert_eq!(result, Ok(()));
        assert!(inner.len() >= len);
        assert!(is_slice_zeroized(&inner));
        assert!(!buffer.alive());
    }
}

#[test]
fn test_destroyed_buffer_is_expired() {
    let buffer = Buffer::new(16).expect("Failed to new(..)");
    buffer.destroy().expect("Failed to destroy()");

    assert_eq!(buffer.data().err(), Some(BufferError::Expired));
    assert_eq!(buffer.write(0, b"a"), Err(BufferError::Expired));
    assert_eq!(buffer.freeze(), Err(BufferError::Expired));
    assert_eq!(buffer.melt(), Err(BufferError::Expired));
    assert_eq!(buffer.equal(b""), Err(BufferError::Expired));
}

#[test]
fn test_destroy_frozen_buffer() {
    let buffer = Buffer::new(16).expect("Failed to new(..)");
    buffer.freeze().expect("Failed to freeze()");

    buffer.destroy().expect("Failed to destroy()");
    assert!(!buffer.alive());
}

// =============================================================================
// canary
// =============================================================================

#[test]
fn test_canary_corruption_detected_on_read() {
    let buffer = Buffer::new(16).expect("Failed to new(..)");
    buffer.corrupt_canary_for_test();

    let err = buffer.data().err();
    assert_eq!(err, Some(BufferError::CanaryMismatch));
    assert!(err.is_some_and(|e| e.is_fatal()));

    // Destroy explicitly so Drop does not escalate.
    assert_eq!(buffer.destroy(), Err(BufferError::CanaryMismatch));
    assert!(!buffer.alive());
}

#[test]
fn test_canary_corruption_detected_on_write() {
    let buffer = Buffer::new(16).expect("Failed to new(..)");
    buffer.corrupt_canary_for_test();

    assert_eq!(buffer.write(0, b"a"), Err(BufferError::CanaryMismatch));
    assert_eq!(buffer.destroy(), Err(BufferError::CanaryMismatch));
}

#[test]
fn test_is_fatal_classification() {
    use crate::error::PageError;

    assert!(BufferError::CanaryMismatch.is_fatal());
    assert!(BufferError::Protection(PageError::Protect).is_fatal());
    assert!(!BufferError::Expired.is_fatal());
    assert!(!BufferError::Immutable.is_fatal());
    assert!(!BufferError::Alloc(PageError::Lock).is_fatal());
}

// =============================================================================
// concurrency
// =============================================================================

#[test]
fn test_concurrent_readers() {
    let buffer = Arc::new(Buffer::from_bytes(&mut [7u8; 64]).expect("Failed to from_bytes(..)"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(buffer.equal(&[7u8; 64]), Ok(true));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Failed to join reader");
    }
}

#[test]
fn test_nested_read_with_queued_writer() {
    let buffer = Arc::new(Buffer::from_bytes(&mut [3u8; 16]).expect("Failed to from_bytes(..)"));
    let (held_tx, held_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();

    let reader = {
        let buffer = Arc::clone(&buffer);
        std::thread::spawn(move || {
            let view = buffer.data().expect("Failed to data()");
            held_tx.send(()).expect("Failed to send");

            // Let the writer queue up behind the view.
            std::thread::sleep(Duration::from_millis(100));

            let nested = buffer.equal(&view);
            result_tx.send(nested).expect("Failed to send");
        })
    };

    held_rx.recv().expect("Failed to recv");
    let writer = {
        let buffer = Arc::clone(&buffer);
        std::thread::spawn(move || buffer.write(0, &[9u8; 16]))
    };

    let nested = result_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("Nested read blocked behind the queued writer");
    assert_eq!(nested, Ok(true));

    reader.join().expect("Failed to join reader");
    assert_eq!(writer.join().expect("Failed to join writer"), Ok(()));
    assert_eq!(&*buffer.data().expect("Failed to data()"), &[9u8; 16]);
}

#[test]
fn test_concurrent_writers_and_destroy() {
    let buffer = Arc::new(Buffer::new(32).expect("Failed to new(..)"));

    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    match buffer.write(0, &[i; 32]) {
                        Ok(()) | Err(BufferError::Expired) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    buffer.destroy().expect("Failed to destroy()");

    for handle in handles {
        handle.join().expect("Failed to join writer");
    }
    assert!(!buffer.alive());
}

#[test]
fn test_debug_does_not_print_contents() {
    let buffer = Buffer::from_bytes(&mut *b"hunter2".to_vec()).expect("Failed to from_bytes(..)");
    let debug = format!("{buffer:?}");

    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("len: 7"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_write_then_read(bytes in prop::collection::vec(any::<u8>(), 1..5000)) {
        let buffer = Buffer::new(bytes.len()).expect("Failed to new(..)");
        buffer.write(0, &bytes).expect("Failed to write(..)");

        prop_assert_eq!(&*buffer.data().expect("Failed to data()"), &bytes[..]);
        prop_assert_eq!(buffer.len(), bytes.len());
    }
}
