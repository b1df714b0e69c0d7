//! Integer helpers shared by the per-pixel filters.

/// Clamps a signed coordinate into `[0, len)` (edge replication).
#[inline]
pub(crate) fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else if i as usize >= len {
        len - 1
    } else {
        i as usize
    }
}

/// Divides `sum` by `count` rounding half up.
#[inline]
pub(crate) fn round_div(sum: u64, count: u64) -> u64 {
    (sum + count / 2) / count
}

/// Offsets a coordinate, returning `None` when it leaves `[0, len)`.
#[inline]
pub(crate) fn offset_index(i: usize, delta: isize, len: usize) -> Option<usize> {
    let shifted = i as isize + delta;
    if shifted < 0 || shifted as usize >= len {
        None
    } else {
        Some(shifted as usize)
    }
}
