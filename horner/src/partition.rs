//! Splitting of the point range across threads.

use std::{num::NonZeroUsize, ops::Range};

/// Returns the amount of points each thread is assigned, `ceil(total / threads)`.
pub fn chunk_size(total: usize, threads: NonZeroUsize) -> usize {
    total.div_ceil(threads.get())
}

/// Partitions `[0, total)` into one contiguous range per thread.
///
/// Thread `k` is assigned `[k * chunk, min((k + 1) * chunk, total))`. Threads
/// whose start falls past `total` receive an empty range at `total`, so the
/// ranges always cover `[0, total)` exactly once and in order.
///
/// # Arguments
/// * `total` - The amount of points.
/// * `threads` - The amount of threads.
///
/// # Returns
/// Exactly `threads` ranges.
pub fn partition(total: usize, threads: NonZeroUsize) -> Vec<Range<usize>> {
    let chunk = chunk_size(total, threads);

    (0..threads.get())
        .map(|k| {
            let start = k.saturating_mul(chunk).min(total);
            let end = start.saturating_add(chunk).min(total);
            start..end
        })
        .collect()
}
