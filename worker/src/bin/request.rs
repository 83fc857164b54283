use std::{fs, io, path::Path, time::Duration};

use comms::msg::Completion;
use log::{debug, warn};
use tokio::time;

use worker::{Settings, WorkerConfig};

const PROGRESS_TICK: Duration = Duration::from_millis(200);

fn read_progress(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Triggers one computation on a running worker, prints its progress and
/// waits for it to finish.
#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let cfg = WorkerConfig::from_env();
    let (trigger, completion) =
        comms::open_signals(&cfg.signal_dir, &cfg.trigger, &cfg.completion);
    let completion = completion.with_poll_interval(cfg.poll);

    let progress_file = match Settings::load(&cfg.config_path) {
        Ok(settings) => settings.progress_file,
        Err(e) => {
            warn!("{e}, progress won't be shown");
            None
        }
    };

    completion.reset()?;
    trigger.set()?;
    debug!("triggered {} in {}", trigger.name(), cfg.signal_dir.display());

    let wait = completion.wait();
    tokio::pin!(wait);

    let mut ticker = time::interval(PROGRESS_TICK);
    let mut shown = None;

    let payload = loop {
        tokio::select! {
            res = &mut wait => break res?,
            _ = ticker.tick() => {
                let current = progress_file.as_deref().and_then(read_progress);
                if let Some(percent) = current.filter(|&p| shown != Some(p)) {
                    println!("progress: {percent}%");
                    shown = Some(percent);
                }
            }
        }
    };

    let msg = Completion::from_bytes(&payload)?;
    println!("{}", String::from_utf8_lossy(&payload));

    if !msg.is_done() {
        let detail = msg.detail.unwrap_or_default();
        return Err(io::Error::other(format!("request failed with {:?}: {detail}", msg.status)));
    }

    Ok(())
}
