//! Property-based tests derived from the invariants documented in
//! `SPEC_FULL.md` §3 and §8, one `proptest!` block per invariant, plus
//! scenario S6 (stress-equivalence across capacities and pseudo-random
//! write/read schedules).

use inmem_pipe::pipe;
use proptest::prelude::*;
use std::io::{Read, Write};
use std::thread;

// =============================================================================
// INV-01 / Property 3: Bounded Occupancy
// "0 <= W - R <= capacity"
// =============================================================================

proptest! {
    /// A single-threaded sequence of try-style writes/reads never reports
    /// more bytes available than the pipe's effective capacity.
    #[test]
    fn prop_bounded_occupancy(
        capacity in 1usize..4096,
        chunk_lens in prop::collection::vec(0usize..64, 0..64),
    ) {
        let (mut w, mut r) = pipe(capacity).unwrap();
        let effective_capacity = capacity.next_power_of_two();
        let mut scratch = vec![0u8; 128];

        for len in chunk_lens {
            let len = len.min(scratch.len());
            let available_before = r.available();
            prop_assert!(available_before as usize <= effective_capacity);

            // Drain everything currently available so a fixed-size write
            // below is guaranteed to fit without suspending.
            if available_before > 0 {
                r.read(&mut scratch, 0, scratch.len()).unwrap();
            }

            let room = effective_capacity.min(scratch.len());
            let len = len.min(room);
            w.write_bulk(&scratch[..len], 0, len).unwrap();
            prop_assert!(r.available() as usize <= effective_capacity);
        }
    }
}

// =============================================================================
// Property 9: Capacity Rounding
// "effective capacity == smallest power of two >= requested"
// =============================================================================

proptest! {
    #[test]
    fn prop_capacity_rounds_up_to_power_of_two(requested in 1usize..1 << 20) {
        let (mut w, _r) = pipe(requested).unwrap();
        let expected = requested.next_power_of_two();
        // Writing exactly `expected` bytes with no concurrent reader must
        // not block; writing one more would overflow the buffer's room.
        w.write_bulk(&vec![0u8; expected], 0, expected).unwrap();
    }
}

// =============================================================================
// Property 1 / 2: Lossless, order-preserving stream
// =============================================================================

proptest! {
    /// For any byte sequence written then the pipe closed, the reader's
    /// output concatenated until EOF equals exactly the bytes written, in
    /// order — across a range of capacities and write chunkings.
    #[test]
    fn prop_lossless_order_preserving(
        capacity in 1usize..256,
        payload in prop::collection::vec(any::<u8>(), 0..512),
        chunk_size in 1usize..64,
    ) {
        let (mut w, mut r) = pipe(capacity).unwrap();
        let payload_clone = payload.clone();

        let producer = thread::spawn(move || {
            for chunk in payload_clone.chunks(chunk_size) {
                w.write_bulk(chunk, 0, chunk.len()).unwrap();
            }
            w.close();
        });

        let mut received = Vec::new();
        r.read_to_end(&mut received).unwrap();
        producer.join().unwrap();

        prop_assert_eq!(received, payload);
    }
}

// =============================================================================
// Scenario S6: stress-equivalence over pseudo-random write/read schedules
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A deterministic pseudo-random schedule of writes with varying
    /// offsets and lengths drawn from `[0, 2*capacity)` produces exactly
    /// the submitted bytes on the reader side, for every capacity in
    /// `SPEC_FULL.md`'s S6 set.
    #[test]
    fn prop_s6_stress_equivalence(
        capacity_idx in 0usize..6,
        segments in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 1..40),
    ) {
        const CAPACITIES: [usize; 6] = [1, 2, 4, 8, 64, 8192];
        let capacity = CAPACITIES[capacity_idx];

        let (mut w, mut r) = pipe(capacity).unwrap();
        let expected: Vec<u8> = segments.iter().flatten().copied().collect();

        let producer = thread::spawn(move || {
            for segment in &segments {
                if !segment.is_empty() {
                    w.write_bulk(segment, 0, segment.len()).unwrap();
                }
            }
            w.close();
        });

        let mut actual = Vec::new();
        r.read_to_end(&mut actual).unwrap();
        producer.join().unwrap();

        prop_assert_eq!(actual, expected);
    }
}
