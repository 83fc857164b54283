use std::{fmt::Display, io, path::Path, sync::Arc};

use comms::{
    NamedEvent,
    msg::{Completion, Status},
};
use horner::{Engine, HornerErr, KernelProvider};
use log::{info, warn};
use tokio::task;

use crate::{
    WorkerConfig,
    config::Settings,
    data::{self, DataErr},
    error::{Result, WorkerErr},
    progress::FileProgress,
};

/// Serves computation requests, one at a time, until it fails.
///
/// Every request:
/// - Waits for the trigger and resets it before doing any work, a request
///   arriving mid computation is served on the next iteration.
/// - Computes on Tokio's blocking pool via `spawn_blocking`.
/// - Signals the completion carrying a `Completion` message, whether the
///   request was served or abandoned.
pub struct RequestLoop {
    cfg: WorkerConfig,
    kernels: Arc<KernelProvider>,
    trigger: NamedEvent,
    completion: NamedEvent,
}

impl RequestLoop {
    /// Creates a new `RequestLoop`, clearing any stale signal.
    ///
    /// # Arguments
    /// * `cfg` - Where the settings and signals live.
    /// * `kernels` - The kernels bound at startup.
    pub fn new(cfg: WorkerConfig, kernels: Arc<KernelProvider>) -> io::Result<Self> {
        let (trigger, completion) =
            comms::create_signals(&cfg.signal_dir, &cfg.trigger, &cfg.completion)?;

        Ok(Self {
            trigger: trigger.with_poll_interval(cfg.poll),
            completion,
            cfg,
            kernels,
        })
    }

    pub fn trigger(&self) -> &NamedEvent {
        &self.trigger
    }

    pub fn completion(&self) -> &NamedEvent {
        &self.completion
    }

    /// Serves requests forever.
    ///
    /// # Errors
    /// Signal I/O failures and thread creation failures, every other failure
    /// only abandons the request at hand.
    pub async fn run(&self) -> Result<()> {
        info!(
            trigger = self.trigger.name(),
            completion = self.completion.name();
            "waiting for requests in {}",
            self.cfg.signal_dir.display()
        );

        loop {
            self.serve_next().await?;
        }
    }

    /// Waits for the next request and serves it.
    ///
    /// # Returns
    /// The completion that was signaled.
    pub async fn serve_next(&self) -> Result<Completion> {
        self.trigger.wait().await?;
        self.trigger.reset()?;
        info!("request received");

        let config_path = self.cfg.config_path.clone();
        let kernels = Arc::clone(&self.kernels);

        let completion = task::spawn_blocking(move || handle_request(&config_path, &kernels))
            .await
            .map_err(|e| WorkerErr::Join(e.to_string()))??;

        self.completion.set_with(&completion.to_bytes()?)?;
        info!("request finished with status {:?}", completion.status);

        Ok(completion)
    }
}

fn abandon<E: Display>(status: Status, err: E) -> Completion {
    warn!("abandoning request: {err}");
    Completion::failed(status, err.to_string())
}

/// Serves a single request: loads the settings and inputs, computes and
/// persists the outputs.
///
/// # Arguments
/// * `config_path` - The settings file of the request.
/// * `kernels` - The kernels bound at startup.
///
/// # Returns
/// The completion to signal, a request that can't be served yields an error
/// status instead of an `Err`.
///
/// # Errors
/// `WorkerErr::Spawn` if the evaluation threads couldn't be created.
pub fn handle_request(config_path: &Path, kernels: &KernelProvider) -> Result<Completion> {
    let settings = match Settings::load(config_path) {
        Ok(settings) => settings,
        Err(e) => return Ok(abandon(Status::ConfigError, e)),
    };
    settings.log();

    let selection = match settings.selection() {
        Ok(selection) => selection,
        Err(e) => return Ok(abandon(Status::InvalidSelection, e)),
    };

    let progress = FileProgress::new(settings.progress_file.clone());
    progress.start();

    let inputs = settings
        .coeffs_file
        .as_deref()
        .ok_or(DataErr::MissingPath("input_coeffs_file"))
        .and_then(data::read_coefficients)
        .and_then(|coeffs| {
            let points = settings
                .points_file
                .as_deref()
                .ok_or(DataErr::MissingPath("input_points_file"))
                .and_then(data::read_points)?;

            Ok((coeffs, points))
        });

    let (coeffs, points) = match inputs {
        Ok(inputs) => inputs,
        Err(e) => return Ok(abandon(Status::InputError, e)),
    };

    let outcome = match Engine::new(kernels).compute(&selection, &coeffs, &points, &progress) {
        Ok(outcome) => outcome,
        Err(HornerErr::Spawn(e)) => return Err(WorkerErr::Spawn(e)),
        Err(e @ HornerErr::KernelUnavailable { .. }) => {
            return Ok(abandon(Status::KernelUnavailable, e));
        }
        Err(e @ HornerErr::InvalidSelection(_)) => return Ok(abandon(Status::InvalidSelection, e)),
        Err(e @ (HornerErr::EmptyCoefficients | HornerErr::EmptyPoints)) => {
            return Ok(abandon(Status::InputError, e));
        }
    };

    let seconds = outcome.seconds();
    persist(&settings, &outcome.results, seconds);

    if settings.generate_chart {
        info!("chart generation requested, no chart renderer is available");
    }

    Ok(Completion::done(seconds))
}

fn persist(settings: &Settings, results: &[f32], seconds: f64) {
    match &settings.time_file {
        Some(path) => {
            if let Err(e) = data::write_computation_time(path, seconds) {
                warn!("failed to write computation time to {}: {e}", path.display());
            }
        }
        None => warn!("computation_time_file is not set, computation time not saved"),
    }

    if !settings.save_results {
        return;
    }

    match &settings.output_file {
        Some(path) => match data::write_results(path, results) {
            Ok(()) => info!("saved {} results to {}", results.len(), path.display()),
            Err(e) => warn!("failed to write results to {}: {e}", path.display()),
        },
        None => warn!("save_results is set but output_file is not, results not saved"),
    }
}
