//! Star-range partitioning.
//!
//! Each range is sized so that, assuming repository counts grow
//! geometrically towards low star counts, it should yield about one of the
//! repositories still wanted. Ranges shrink as the remaining demand drops and
//! descend contiguously from the ceiling to zero.

use crate::index::StarRange;

/// Lower bound of the next range: `floor(stars_max * (remaining - 1) / remaining)`.
///
/// `remaining == 0` means nothing is wanted and yields `stars_max`.
#[must_use]
pub fn next_star_min(stars_max: u64, remaining: usize) -> u64 {
    if remaining == 0 {
        return stars_max;
    }
    let remaining = remaining as u128;
    // The quotient never exceeds stars_max, so it fits back into u64.
    ((u128::from(stars_max) * (remaining - 1)) / remaining) as u64
}

/// The range to search next, ending at `stars_max`.
#[must_use]
pub fn next_range(stars_max: u64, remaining: usize) -> StarRange {
    StarRange {
        min: next_star_min(stars_max, remaining),
        max: stars_max,
    }
}

/// Upper bound of the range after `range`, or `None` once zero is covered.
#[must_use]
pub fn next_max_below(range: StarRange) -> Option<u64> {
    range.min.checked_sub(1)
}
