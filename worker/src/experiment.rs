use std::{
    error::Error,
    fmt, fs,
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use comms::{NamedEvent, msg::Completion};
use horner::Family;
use log::{info, warn};
use rand::{
    Rng, SeedableRng,
    distr::{Distribution, Uniform, uniform},
    rngs::StdRng,
};

use crate::{Settings, WorkerConfig, data::PointRange};

pub const CSV_HEADER: &str = "scenario,implementation,avx,threads,run_number,time_seconds";

/// Recorded for a run that failed or never completed.
pub const FAILED_TIME: f64 = -1.0;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_RUNS: NonZeroUsize = NonZeroUsize::new(5).unwrap();

const COEFFS_FILE: &str = "coefficients.txt";
const POINTS_FILE: &str = "points.txt";
const TIME_FILE: &str = "computation.time";

/// Errors running an experiment.
#[derive(Debug)]
pub enum ExperimentErr {
    Io(io::Error),
    CoefficientRange { low: f32, high: f32, source: uniform::Error },
}

impl fmt::Display for ExperimentErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentErr::Io(e) => write!(f, "io error: {e}"),
            ExperimentErr::CoefficientRange { low, high, source } => {
                write!(f, "invalid coefficient range [{low}, {high}]: {source}")
            }
        }
    }
}

impl Error for ExperimentErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExperimentErr::Io(e) => Some(e),
            ExperimentErr::CoefficientRange { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for ExperimentErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ExperimentErr> for io::Error {
    fn from(value: ExperimentErr) -> Self {
        match value {
            ExperimentErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExperimentErr>;

/// One polynomial size evaluated over one point range.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub coeffs: usize,
    pub low: f32,
    pub high: f32,
    pub points: PointRange,
}

impl Scenario {
    /// A scenario of `coeffs` coefficients drawn from [-1, 1], evaluated
    /// on -100..=100 in steps of 0.001.
    pub fn new(name: impl Into<String>, coeffs: usize) -> Self {
        Self {
            name: name.into(),
            coeffs,
            low: -1.0,
            high: 1.0,
            points: PointRange {
                start: -100.0,
                end: 100.0,
                step: 0.001,
            },
        }
    }
}

/// The grid of configurations an experiment measures.
///
/// Every scenario is run with every implementation, AVX setting and thread
/// count, `runs` times each, always multithreaded.
#[derive(Debug, Clone)]
pub struct Plan {
    pub scenarios: Vec<Scenario>,
    pub implementations: Vec<Family>,
    pub avx: Vec<bool>,
    pub threads: Vec<NonZeroUsize>,
    pub runs: NonZeroUsize,
    pub timeout: Duration,
    pub seed: Option<u64>,
}

impl Plan {
    /// The number of requests the plan issues.
    pub fn total_runs(&self) -> usize {
        self.scenarios.len()
            * self.implementations.len()
            * self.avx.len()
            * self.threads.len()
            * self.runs.get()
    }
}

impl Default for Plan {
    fn default() -> Self {
        let scenarios = [10, 100, 1_000, 10_000, 100_000]
            .into_iter()
            .enumerate()
            .map(|(i, n)| Scenario::new(format!("Scenario{}", i + 1), n))
            .collect();

        Self {
            scenarios,
            implementations: vec![Family::Primary, Family::Alternate],
            avx: vec![false, true],
            threads: (1..=16).filter_map(NonZeroUsize::new).collect(),
            runs: DEFAULT_RUNS,
            timeout: DEFAULT_TIMEOUT,
            seed: None,
        }
    }
}

/// A single measurement, one line of the results CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub scenario: String,
    pub implementation: Family,
    pub avx: bool,
    pub threads: NonZeroUsize,
    pub run: usize,
    pub seconds: f64,
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.scenario, self.implementation, self.avx, self.threads, self.run, self.seconds
        )
    }
}

/// Writes `n` coefficients drawn uniformly from [`low`, `high`], one per line.
///
/// # Errors
/// `CoefficientRange` if `low > high` or either bound isn't finite.
pub fn generate_coefficients<R: Rng>(
    path: &Path,
    n: usize,
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<()> {
    let distribution = Uniform::new_inclusive(low, high)
        .map_err(|source| ExperimentErr::CoefficientRange { low, high, source })?;

    let text: String = distribution
        .sample_iter(rng)
        .take(n)
        .map(|c| format!("{c}\n"))
        .collect();

    fs::write(path, text)?;
    Ok(())
}

/// Writes the point range file read by the worker.
pub fn write_points(path: &Path, range: &PointRange) -> io::Result<()> {
    fs::write(path, format!("{range}\n"))
}

/// Writes the inputs of `scenario` into `dir`, returning the coefficients
/// and points paths.
fn prepare(dir: &Path, scenario: &Scenario, rng: &mut StdRng) -> Result<(PathBuf, PathBuf)> {
    let coeffs = dir.join(COEFFS_FILE);
    let points = dir.join(POINTS_FILE);

    generate_coefficients(&coeffs, scenario.coeffs, scenario.low, scenario.high, rng)?;
    write_points(&points, &scenario.points)?;

    info!(
        coeffs = scenario.coeffs;
        "prepared {} over {}",
        scenario.name,
        scenario.points
    );

    Ok((coeffs, points))
}

/// Drives a running worker through every configuration of a `Plan`.
pub struct Experiment {
    plan: Plan,
    config_path: PathBuf,
    work_dir: PathBuf,
    trigger: NamedEvent,
    completion: NamedEvent,
    rng: StdRng,
}

impl Experiment {
    /// Creates a new `Experiment`.
    ///
    /// # Arguments
    /// * `plan` - The configurations to measure.
    /// * `cfg` - Where the worker reads its settings and its signals live.
    /// * `work_dir` - Where the generated inputs are kept, created if missing.
    pub fn new(plan: Plan, cfg: &WorkerConfig, work_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&work_dir)?;

        let (trigger, completion) =
            comms::open_signals(&cfg.signal_dir, &cfg.trigger, &cfg.completion);

        let rng = match plan.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            plan,
            config_path: cfg.config_path.clone(),
            work_dir,
            trigger,
            completion: completion.with_poll_interval(cfg.poll),
            rng,
        })
    }

    /// Runs the whole plan, writing one CSV row per request to `csv`.
    ///
    /// # Returns
    /// Every row written, in order.
    ///
    /// # Errors
    /// Failing to write the inputs, the settings or the CSV, or to touch the
    /// signals. A request that fails or times out is recorded as `FAILED_TIME`.
    pub async fn run(&mut self, csv: &Path) -> Result<Vec<Row>> {
        let mut out = BufWriter::new(fs::File::create(csv)?);
        writeln!(out, "{CSV_HEADER}")?;

        let total = self.plan.total_runs();
        let mut rows = Vec::with_capacity(total);

        for scenario in &self.plan.scenarios {
            let (coeffs, points) = prepare(&self.work_dir, scenario, &mut self.rng)?;

            for &implementation in &self.plan.implementations {
                for &avx in &self.plan.avx {
                    for &threads in &self.plan.threads {
                        for run in 1..=self.plan.runs.get() {
                            let settings = Settings {
                                implementation: implementation.name().to_string(),
                                multithreading: true,
                                threads,
                                avx,
                                coeffs_file: Some(coeffs.clone()),
                                points_file: Some(points.clone()),
                                time_file: Some(self.work_dir.join(TIME_FILE)),
                                ..Settings::default()
                            };

                            let row = Row {
                                scenario: scenario.name.clone(),
                                implementation,
                                avx,
                                threads,
                                run,
                                seconds: self.measure(&settings).await?,
                            };

                            writeln!(out, "{row}")?;
                            out.flush()?;

                            info!(
                                done = rows.len() + 1,
                                total = total;
                                "measured {row}"
                            );
                            rows.push(row);
                        }
                    }
                }
            }
        }

        info!("experiment finished, results saved to {}", csv.display());
        Ok(rows)
    }

    /// Issues one request and waits for its completion.
    async fn measure(&self, settings: &Settings) -> Result<f64> {
        settings.save(&self.config_path)?;

        self.completion.reset()?;
        self.trigger.set()?;

        let Some(payload) = self.completion.wait_timeout(self.plan.timeout).await? else {
            warn!("no completion within {:?}", self.plan.timeout);
            return Ok(FAILED_TIME);
        };

        let msg = Completion::from_bytes(&payload)?;
        match msg.elapsed {
            Some(seconds) if msg.is_done() => Ok(seconds),
            _ => {
                warn!(
                    "request failed with {:?}: {}",
                    msg.status,
                    msg.detail.unwrap_or_default()
                );
                Ok(FAILED_TIME)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_grid() {
        let plan = Plan::default();

        assert_eq!(plan.scenarios.len(), 5);
        assert_eq!(plan.scenarios[4].coeffs, 100_000);
        assert_eq!(plan.threads.first().map(|t| t.get()), Some(1));
        assert_eq!(plan.threads.last().map(|t| t.get()), Some(16));
        assert_eq!(plan.total_runs(), 5 * 2 * 2 * 16 * 5);
    }

    #[test]
    fn test_generated_coefficients_stay_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coeffs.txt");
        let mut rng = StdRng::seed_from_u64(7);

        generate_coefficients(&path, 50, -1.0, 1.0, &mut rng).unwrap();

        let coeffs = crate::data::read_coefficients(&path).unwrap();
        assert_eq!(coeffs.len(), 50);
        assert!(coeffs.iter().all(|c| (-1.0..=1.0).contains(c)));
    }

    #[test]
    fn test_seeded_coefficients_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        generate_coefficients(&a, 10, -1.0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        generate_coefficients(&b, 10, -1.0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }

    #[test]
    fn test_reversed_coefficient_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let err = generate_coefficients(&dir.path().join("c.txt"), 3, 1.0, -1.0, &mut rng)
            .unwrap_err();
        assert!(matches!(err, ExperimentErr::CoefficientRange { .. }), "{err}");
    }

    #[test]
    fn test_points_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        let range = Scenario::new("s", 1).points;

        write_points(&path, &range).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(PointRange::parse(&text).unwrap(), range);
    }

    #[test]
    fn test_row_format() {
        let row = Row {
            scenario: "Scenario1".to_string(),
            implementation: Family::Alternate,
            avx: true,
            threads: NonZeroUsize::new(4).unwrap(),
            run: 2,
            seconds: FAILED_TIME,
        };

        assert_eq!(row.to_string(), "Scenario1,asm,true,4,2,-1");
    }
}
