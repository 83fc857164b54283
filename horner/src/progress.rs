//! Progress accounting shared by every evaluation thread.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Receives progress percentages while a computation runs.
///
/// Several threads may report at once, implementors must tolerate concurrent,
/// duplicated and slightly out of order percentages.
pub trait ProgressSink: Sync {
    /// Should publish `percent`, a value in `[0, 100]`.
    fn report(&self, percent: u32);
}

/// A sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u32) {}
}

/// Counts the points evaluated so far for a single computation.
pub struct Progress<'s, S: ?Sized> {
    counter: AtomicUsize,
    total: usize,
    interval: NonZeroUsize,
    sink: &'s S,
}

impl<'s, S: ProgressSink + ?Sized> Progress<'s, S> {
    /// Creates a new `Progress` reporting roughly every 2% of `total`.
    ///
    /// # Arguments
    /// * `total` - The amount of points of the computation.
    /// * `sink` - Where to publish the percentages.
    pub fn new(total: usize, sink: &'s S) -> Self {
        Self::with_interval(total, default_interval(total), sink)
    }

    /// Creates a new `Progress` with an explicit update interval.
    ///
    /// # Arguments
    /// * `total` - The amount of points of the computation.
    /// * `interval` - The amount of points between two reports.
    /// * `sink` - Where to publish the percentages.
    pub fn with_interval(total: usize, interval: NonZeroUsize, sink: &'s S) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            total,
            interval,
            sink,
        }
    }

    /// Records `n` more evaluated points.
    ///
    /// Reports to the sink whenever the counter crosses a multiple of the
    /// interval, and once more when it reaches the total.
    pub fn advance(&self, n: usize) {
        let prev = self.counter.fetch_add(n, Ordering::AcqRel);
        let now = prev + n;
        let interval = self.interval.get();

        if prev / interval != now / interval || now == self.total {
            self.sink.report(self.percent(now));
        }
    }

    /// Returns `floor(done * 100 / total)`.
    pub fn percent(&self, done: usize) -> u32 {
        if self.total == 0 {
            return 100;
        }

        (done.saturating_mul(100) / self.total) as u32
    }

    /// Returns the amount of points evaluated so far.
    pub fn completed(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }

    pub fn interval(&self) -> NonZeroUsize {
        self.interval
    }
}

/// Returns `max(1, 2 * total / 100)`.
pub fn default_interval(total: usize) -> NonZeroUsize {
    NonZeroUsize::new(total.saturating_mul(2) / 100).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, thread};

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<u32>>);

    impl ProgressSink for Recorder {
        fn report(&self, percent: u32) {
            self.0.lock().unwrap().push(percent);
        }
    }

    impl Recorder {
        fn reports(&self) -> Vec<u32> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_default_interval_is_never_zero() {
        assert_eq!(default_interval(0).get(), 1);
        assert_eq!(default_interval(1).get(), 1);
        assert_eq!(default_interval(49).get(), 1);
        assert_eq!(default_interval(100).get(), 2);
        assert_eq!(default_interval(1000).get(), 20);
    }

    #[test]
    fn test_unit_advances_report_on_multiples() {
        let sink = Recorder::default();
        let progress = Progress::with_interval(10, NonZeroUsize::new(3).unwrap(), &sink);

        for _ in 0..10 {
            progress.advance(1);
        }

        // 3, 6, 9 and the final 10.
        assert_eq!(sink.reports(), vec![30, 60, 90, 100]);
        assert_eq!(progress.completed(), 10);
    }

    #[test]
    fn test_block_advances_report_on_crossings() {
        let sink = Recorder::default();
        let progress = Progress::with_interval(20, NonZeroUsize::new(5).unwrap(), &sink);

        progress.advance(8); // crosses 5
        progress.advance(8); // crosses 10 and 15
        progress.advance(1);
        progress.advance(1);
        progress.advance(1);
        progress.advance(1); // reaches 20

        assert_eq!(sink.reports(), vec![40, 80, 100]);
    }

    #[test]
    fn test_percent_is_floored() {
        let progress = Progress::new(3, &NoProgress);
        assert_eq!(progress.percent(1), 33);
        assert_eq!(progress.percent(2), 66);
        assert_eq!(progress.percent(3), 100);
    }

    #[test]
    fn test_concurrent_advances_reach_total() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let sink = Recorder::default();
        let progress = Progress::new(THREADS * PER_THREAD, &sink);

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..PER_THREAD {
                        progress.advance(1);
                    }
                });
            }
        });

        assert_eq!(progress.completed(), THREADS * PER_THREAD);
        assert!(sink.reports().contains(&100));
        assert!(sink.reports().iter().all(|&p| p <= 100));
    }
}
