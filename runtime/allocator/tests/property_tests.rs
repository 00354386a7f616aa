//! Property-based tests for the chunk allocator.
//!
//! Uses proptest to drive the codec and the allocator with random inputs and
//! checks them against a plain occupancy model.

use chunk_allocator::{ChunkAllocator, Handle, Status, StatusTable, CHUNK_SIZE};
use proptest::prelude::*;

/// 1024 bytes: 31 status bytes, 124 chunks, no trailing waste
const REGION: usize = 1024;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    Release(usize),
}

fn status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Free),
        Just(Status::TagA),
        Just(Status::TagB),
        Just(Status::TagC),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..=200).prop_map(Op::Allocate),
        2 => any::<usize>().prop_map(Op::Release),
    ]
}

/// First index of `len` consecutive free slots in the model
fn model_first_fit(occupied: &[bool], len: usize) -> Option<usize> {
    let mut run = 0;
    for (idx, &used) in occupied.iter().enumerate() {
        if used {
            run = 0;
            continue;
        }
        run += 1;
        if run == len {
            return Some(idx + 1 - len);
        }
    }
    None
}

proptest! {
    /// Range writes set exactly the requested chunks
    #[test]
    fn write_range_stays_in_bounds(
        initial in prop::collection::vec(any::<u8>(), 1..16),
        a in any::<usize>(),
        b in any::<usize>(),
        code in status(),
    ) {
        let before = StatusTable::new(initial.clone());
        let chunks = before.len();
        let (first, last) = {
            let (x, y) = (a % chunks, b % chunks);
            (x.min(y), x.max(y))
        };

        let mut table = StatusTable::new(initial);
        table.write_range(first, last, code);

        for chunk in 0..chunks {
            if (first..=last).contains(&chunk) {
                prop_assert_eq!(table.read(chunk), code);
            } else {
                prop_assert_eq!(table.read(chunk), before.read(chunk));
            }
        }
    }

    /// Single writes touch only their own two bits
    #[test]
    fn write_one_stays_in_bounds(
        initial in prop::collection::vec(any::<u8>(), 1..8),
        idx in any::<usize>(),
        code in status(),
    ) {
        let before = StatusTable::new(initial.clone());
        let chunk = idx % before.len();

        let mut table = StatusTable::new(initial);
        table.write_one(chunk, code);

        for other in 0..before.len() {
            let expected = if other == chunk { code } else { before.read(other) };
            prop_assert_eq!(table.read(other), expected);
        }
    }

    /// Random allocate/release sequences agree with a first-fit model,
    /// never overlap, and release exactly what they allocated
    #[test]
    fn allocator_matches_model(ops in prop::collection::vec(op(), 1..80)) {
        let mut alloc = ChunkAllocator::new([0u8; REGION]).unwrap();
        let chunk_count = alloc.chunk_count();
        let mut occupied = vec![false; chunk_count];
        let mut live: Vec<(Handle, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(size) => {
                    let chunks = size.div_ceil(CHUNK_SIZE);
                    let expected = if size == 0 { None } else { model_first_fit(&occupied, chunks) };
                    let before = alloc.status_bytes().to_vec();

                    let handle = alloc.allocate(size);
                    prop_assert_eq!(handle.map(Handle::chunk_index), expected);

                    match handle {
                        Some(handle) => {
                            let first = handle.chunk_index();
                            occupied[first..first + chunks].fill(true);
                            live.push((handle, chunks));
                        }
                        None => {
                            prop_assert_eq!(alloc.status_bytes(), &before[..]);
                        }
                    }
                }
                Op::Release(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (handle, chunks) = live.swap_remove(pick % live.len());
                    let used = alloc.used_chunks();

                    prop_assert!(alloc.release(handle).is_ok());
                    prop_assert_eq!(alloc.used_chunks(), used - chunks);

                    let first = handle.chunk_index();
                    occupied[first..first + chunks].fill(false);
                }
            }

            // Every live block is a single tag, distinct from touching blocks
            for &(handle, chunks) in &live {
                let first = handle.chunk_index();
                let tag = alloc.status(first).unwrap();
                prop_assert!(!tag.is_free());
                for chunk in first..first + chunks {
                    prop_assert_eq!(alloc.status(chunk), Some(tag));
                }
                if let Some(after) = alloc.status(first + chunks) {
                    prop_assert_ne!(after, tag);
                }
            }

            let model_used = occupied.iter().filter(|&&used| used).count();
            prop_assert_eq!(alloc.used_chunks(), model_used);
        }
    }
}
