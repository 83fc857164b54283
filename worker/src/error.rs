use std::{error::Error, fmt, io};

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Failures the request loop can't recover from.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    Spawn(io::Error),
    Join(String),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::Spawn(e) => write!(f, "failed to spawn evaluation threads: {e}"),
            WorkerErr::Join(detail) => write!(f, "request task failed: {detail}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) | WorkerErr::Spawn(e) => Some(e),
            WorkerErr::Join(_) => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Io(e) | WorkerErr::Spawn(e) => e,
            other => io::Error::other(other),
        }
    }
}
