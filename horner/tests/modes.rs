use std::{num::NonZeroUsize, sync::Mutex};

use horner::{Engine, Family, KernelProvider, NoProgress, ProgressSink, Selection};

#[derive(Default)]
struct Recorder(Mutex<Vec<u32>>);

impl ProgressSink for Recorder {
    fn report(&self, percent: u32) {
        self.0.lock().unwrap().push(percent);
    }
}

fn coefficients() -> Vec<f32> {
    (0..37).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect()
}

fn points(n: usize) -> Vec<f32> {
    (0..n).map(|k| -1.5 + k as f32 * 0.0137).collect()
}

fn all_selections(family: Family, threads: usize) -> Vec<Selection> {
    let threads = NonZeroUsize::new(threads).unwrap();
    let base = Selection::new(family);

    vec![
        base,
        base.vectorized(),
        base.multithreaded(threads),
        base.vectorized().multithreaded(threads),
    ]
}

fn available_families(kernels: &KernelProvider) -> Vec<Family> {
    [Family::Primary, Family::Alternate]
        .into_iter()
        .filter(|&f| kernels.scalar(f).is_ok() && kernels.vector(f).is_ok())
        .collect()
}

#[test]
fn every_mode_produces_identical_results() {
    let kernels = KernelProvider::resolve();
    let engine = Engine::new(&kernels);
    let coeffs = coefficients();
    let points = points(1003);

    let reference = engine
        .compute(&Selection::new(Family::Primary), &coeffs, &points, &NoProgress)
        .unwrap()
        .results;

    for family in available_families(&kernels) {
        for threads in [1, 2, 3, 7, 16] {
            for selection in all_selections(family, threads) {
                let outcome = engine
                    .compute(&selection, &coeffs, &points, &NoProgress)
                    .unwrap();

                assert_eq!(outcome.results.len(), points.len());
                for (k, (got, expected)) in outcome.results.iter().zip(&reference).enumerate() {
                    assert_eq!(
                        got.to_bits(),
                        expected.to_bits(),
                        "{family} {} threads={threads}: mismatch at point {k}",
                        selection.mode()
                    );
                }
            }
        }
    }
}

#[test]
fn results_follow_the_polynomial() {
    let kernels = KernelProvider::resolve();
    let engine = Engine::new(&kernels);
    let coeffs = [1.0, 2.0, 3.0];
    let points = [0.0, 0.25, 0.5, 0.75, 1.0, 2.0, -1.0, 3.0, 10.0];

    for selection in all_selections(Family::Primary, 4) {
        let outcome = engine
            .compute(&selection, &coeffs, &points, &NoProgress)
            .unwrap();

        let expected: Vec<f32> = points.iter().map(|x| 1.0 + 2.0 * x + 3.0 * x * x).collect();
        for (got, want) in outcome.results.iter().zip(&expected) {
            assert!((got - want).abs() <= 1e-4 * want.abs().max(1.0), "{got} != {want}");
        }
        assert_eq!(outcome.results[5], 17.0);
    }
}

#[test]
fn progress_reaches_total_for_every_thread_count() {
    let kernels = KernelProvider::resolve();
    let engine = Engine::new(&kernels);
    let coeffs = coefficients();

    for n in [1, 7, 8, 9, 100, 517] {
        let points = points(n);

        for threads in [1, 2, 5, 12] {
            for selection in all_selections(Family::Primary, threads) {
                let sink = Recorder::default();
                let outcome = engine.compute(&selection, &coeffs, &points, &sink).unwrap();

                assert_eq!(outcome.evaluated, n, "{} threads={threads}", selection.mode());

                let reports = sink.0.into_inner().unwrap();
                assert!(reports.contains(&100), "{} n={n}: {reports:?}", selection.mode());
                assert!(reports.iter().all(|&p| p <= 100));
            }
        }
    }
}

#[test]
fn elapsed_time_is_reported() {
    let kernels = KernelProvider::resolve();
    let engine = Engine::new(&kernels);
    let selection = Selection::new(Family::Primary).vectorized();

    let outcome = engine
        .compute(&selection, &coefficients(), &points(4096), &NoProgress)
        .unwrap();

    assert!(outcome.seconds() >= 0.0);
    assert_eq!(outcome.seconds(), outcome.elapsed.as_secs_f64());
}

#[test]
fn invalid_implementation_is_refused_before_computing() {
    let res = Selection::parse("java", true, true, NonZeroUsize::new(2).unwrap());
    assert!(matches!(res, Err(horner::HornerErr::InvalidSelection(_))));
}
