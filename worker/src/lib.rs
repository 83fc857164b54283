pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
mod loop_;
pub mod progress;

pub use config::{Settings, WorkerConfig};
pub use error::{Result, WorkerErr};
pub use experiment::{Experiment, Plan};
pub use loop_::{RequestLoop, handle_request};
pub use progress::FileProgress;
