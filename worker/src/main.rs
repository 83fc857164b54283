use std::{io, sync::Arc};

use horner::KernelProvider;
use log::info;
use tokio::signal;

use worker::{RequestLoop, WorkerConfig};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let cfg = WorkerConfig::from_env();
    info!("reading settings from {}", cfg.config_path.display());

    let kernels = Arc::new(KernelProvider::resolve());
    let request_loop = RequestLoop::new(cfg, kernels)?;

    tokio::select! {
        ret = request_loop.run() => {
            ret?;
        }
        _ = signal::ctrl_c() => {
            info!("received SIGINT, shutting down");
        }
    }

    Ok(())
}
