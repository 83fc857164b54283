use std::{env, io, path::PathBuf, time::Duration};

use log::info;

use worker::{Experiment, Plan, WorkerConfig, experiment::DEFAULT_TIMEOUT};

const DEFAULT_CSV: &str = "experiment_results.csv";

/// Measures a running worker over the whole experiment grid, writing the
/// computation time of every request to a CSV file.
#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let cfg = WorkerConfig::from_env();

    let work_dir = env::var("HORNER_EXPERIMENT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("horner-experiment"));

    let csv = env::var("HORNER_EXPERIMENT_CSV")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV));

    let timeout = env::var("HORNER_EXPERIMENT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let seed = env::var("HORNER_EXPERIMENT_SEED")
        .ok()
        .and_then(|v| v.parse().ok());

    let plan = Plan {
        timeout,
        seed,
        ..Plan::default()
    };
    info!(
        runs = plan.total_runs();
        "running experiment against {}",
        cfg.signal_dir.display()
    );

    let mut experiment = Experiment::new(plan, &cfg, work_dir)?;
    experiment.run(&csv).await?;

    Ok(())
}
