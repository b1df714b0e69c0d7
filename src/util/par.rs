//! Row-partitioned helpers for per-pixel stages.
//!
//! Every per-pixel stage writes a fresh output buffer. The buffer is split
//! into disjoint rows, so workers never share a write target and no locking
//! is involved. With the `rayon` feature the rows are distributed over the
//! current rayon pool (the engine pool while a pipeline runs); otherwise they
//! are processed in order on the calling thread.

/// Calls `f(y, row)` for every `row_len`-sized row of `out`.
pub(crate) fn for_each_row<T, F>(out: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }

    #[cfg(not(feature = "rayon"))]
    for (y, row) in out.chunks_mut(row_len).enumerate() {
        f(y, row);
    }
}

#[cfg(test)]
mod tests {
    use super::for_each_row;

    #[test]
    fn rows_receive_their_index() {
        let mut out = vec![0u8; 12];
        for_each_row(&mut out, 4, |y, row| row.fill(y as u8 + 1));
        assert_eq!(out, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    }
}
