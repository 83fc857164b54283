use std::{
    num::NonZeroUsize,
    thread,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::{
    error::{HornerErr, Result},
    evaluation::Strategy,
    kernels::KernelProvider,
    partition::partition,
    progress::{Progress, ProgressSink},
    selection::{Mode, Selection},
};

/// The result of a single computation.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// `results[k]` is the polynomial evaluated at the `k`-th point.
    pub results: Vec<f32>,
    /// Wall-clock time spent in the dispatched mode.
    pub elapsed: Duration,
    /// The final value of the progress counter.
    pub evaluated: usize,
}

impl Outcome {
    /// Returns the elapsed time in seconds.
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Evaluates polynomials with the kernels of a `KernelProvider`.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'k> {
    kernels: &'k KernelProvider,
}

impl<'k> Engine<'k> {
    /// Creates a new `Engine`.
    ///
    /// # Arguments
    /// * `kernels` - The kernels bound at startup.
    pub fn new(kernels: &'k KernelProvider) -> Self {
        Self { kernels }
    }

    /// Evaluates the polynomial at every point using the selected mode.
    ///
    /// # Arguments
    /// * `selection` - The kernel family and execution mode.
    /// * `coeffs` - The coefficients, index `i` being the coefficient of degree `i`.
    /// * `points` - The points to evaluate at.
    /// * `sink` - Where to publish progress while computing.
    ///
    /// # Returns
    /// The results, one per point, and the time the computation took.
    ///
    /// # Errors
    /// Returns `EmptyCoefficients` or `EmptyPoints` on empty inputs, `KernelUnavailable`
    /// if the selection needs a kernel that was never bound and `Spawn` if an evaluation
    /// thread couldn't be created. Nothing is computed in the first three cases.
    pub fn compute<S>(
        &self,
        selection: &Selection,
        coeffs: &[f32],
        points: &[f32],
        sink: &S,
    ) -> Result<Outcome>
    where
        S: ProgressSink + ?Sized,
    {
        if coeffs.is_empty() {
            return Err(HornerErr::EmptyCoefficients);
        }

        if points.is_empty() {
            return Err(HornerErr::EmptyPoints);
        }

        let strategy = self.bind(selection)?;
        let mode = selection.mode();
        let progress = Progress::new(points.len(), sink);
        let mut results = vec![0.0; points.len()];

        info!(
            points = points.len(),
            coeffs = coeffs.len(),
            threads = selection.threads.get();
            "dispatching {mode} computation with the {} kernels",
            selection.family
        );

        let start = Instant::now();

        match mode {
            Mode::Scalar | Mode::Vectorized => {
                strategy.run(coeffs, points, &mut results, &progress);
            }
            Mode::ScalarMultithreaded | Mode::VectorizedMultithreaded => {
                run_partitioned(
                    strategy,
                    selection.threads,
                    coeffs,
                    points,
                    &mut results,
                    &progress,
                )?;
            }
        }

        let elapsed = start.elapsed();
        info!("computation completed in {} seconds", elapsed.as_secs_f64());

        Ok(Outcome {
            results,
            elapsed,
            evaluated: progress.completed(),
        })
    }

    /// Resolves the kernels the selection needs.
    fn bind(&self, selection: &Selection) -> Result<Strategy> {
        let family = selection.family;
        let scalar = self.kernels.scalar(family)?;

        if selection.vectorized {
            let vector = self.kernels.vector(family)?;
            Ok(Strategy::Vector {
                vector,
                tail: scalar,
            })
        } else {
            Ok(Strategy::Scalar(scalar))
        }
    }
}

/// Runs `strategy` on one scoped thread per non-empty range of the partition.
///
/// Every thread owns a disjoint slice of `results`, all of them share `progress`.
/// Returns once every spawned thread has been joined.
fn run_partitioned<S>(
    strategy: Strategy,
    threads: NonZeroUsize,
    coeffs: &[f32],
    points: &[f32],
    results: &mut [f32],
    progress: &Progress<'_, S>,
) -> Result<()>
where
    S: ProgressSink + ?Sized,
{
    let ranges = partition(points.len(), threads);

    thread::scope(|scope| -> Result<()> {
        let mut rest = results;

        for (id, range) in ranges.into_iter().enumerate() {
            if range.is_empty() {
                debug!(thread = id; "empty range, not spawning");
                continue;
            }

            let (out, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            rest = tail;

            debug!(thread = id, start = range.start, end = range.end; "spawning");
            let points = &points[range];

            thread::Builder::new()
                .name(format!("horner-{id}"))
                .spawn_scoped(scope, move || strategy.run(coeffs, points, out, progress))
                .map_err(HornerErr::Spawn)?;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        kernels::{Family, KernelKind, KernelSet},
        progress::NoProgress,
    };

    fn provider() -> KernelProvider {
        KernelProvider::resolve()
    }

    #[test]
    fn test_quadratic_at_two() {
        let kernels = provider();
        let engine = Engine::new(&kernels);
        let selection = Selection::new(Family::Primary);

        let outcome = engine
            .compute(&selection, &[1.0, 2.0, 3.0], &[2.0], &NoProgress)
            .unwrap();

        assert_eq!(outcome.results, vec![17.0]);
        assert_eq!(outcome.evaluated, 1);
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let kernels = provider();
        let engine = Engine::new(&kernels);
        let selection = Selection::new(Family::Primary);

        let res = engine.compute(&selection, &[], &[1.0], &NoProgress);
        assert!(matches!(res, Err(HornerErr::EmptyCoefficients)));

        let res = engine.compute(&selection, &[1.0], &[], &NoProgress);
        assert!(matches!(res, Err(HornerErr::EmptyPoints)));
    }

    #[test]
    fn test_refuses_unbound_kernels() {
        let kernels = KernelProvider::from_sets(KernelSet::default(), KernelSet::default());
        let engine = Engine::new(&kernels);

        let selection = Selection::new(Family::Alternate).vectorized();
        let res = engine.compute(&selection, &[1.0], &[1.0], &NoProgress);

        assert!(matches!(
            res,
            Err(HornerErr::KernelUnavailable {
                family: Family::Alternate,
                kind: KernelKind::Scalar
            })
        ));
    }

    #[test]
    fn test_more_threads_than_points() {
        let kernels = provider();
        let engine = Engine::new(&kernels);
        let selection = Selection::new(Family::Primary)
            .vectorized()
            .multithreaded(NonZeroUsize::new(16).unwrap());

        let points = [0.0, 1.0, 2.0];
        let outcome = engine
            .compute(&selection, &[1.0, 1.0], &points, &NoProgress)
            .unwrap();

        assert_eq!(outcome.results, vec![1.0, 2.0, 3.0]);
        assert_eq!(outcome.evaluated, 3);
    }
}
