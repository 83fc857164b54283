mod engine;
pub mod error;
mod evaluation;
pub mod kernels;
pub mod partition;
pub mod progress;
mod selection;

pub use engine::{Engine, Outcome};
pub use error::{HornerErr, Result};
pub use kernels::{BLOCK, Family, KernelKind, KernelProvider, KernelSet, ScalarKernel, VectorKernel};
pub use progress::{NoProgress, Progress, ProgressSink};
pub use selection::{Mode, Selection};
