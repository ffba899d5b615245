//! Debug assertion macros for pipe invariants.
//!
//! These macros provide runtime checks for the invariants documented in `SPEC_FULL.md`
//! §3. They are only active in debug builds (`debug_assert!` is compiled out entirely
//! in release), so there is zero overhead in release builds.

// =============================================================================
// INV-01: Bounded Occupancy — `0 <= W - R <= capacity`
// =============================================================================

/// Assert that occupancy does not exceed capacity after a cursor publish.
///
/// Used in: `PipeInner::try_write` after computing the new `write_pos`,
/// and `PipeInner::try_read` after computing the new `read_pos`.
macro_rules! debug_assert_bounded_occupancy {
    ($write_pos:expr, $read_pos:expr, $capacity:expr) => {
        debug_assert!(
            $write_pos >= $read_pos && ($write_pos - $read_pos) as usize <= $capacity,
            "INV-01 violated: occupancy {} exceeds capacity {} (W={}, R={})",
            $write_pos.saturating_sub($read_pos),
            $capacity,
            $write_pos,
            $read_pos
        )
    };
}

// =============================================================================
// INV-02: Monotonic Progress — a cursor only ever increases
// =============================================================================

/// Assert that a cursor (W or R) only increases.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_monotonic;
