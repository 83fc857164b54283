use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use crate::kernels::{Family, KernelKind};

/// The result type used in the entire evaluation engine.
pub type Result<T> = std::result::Result<T, HornerErr>;

/// The evaluation engine's error type.
#[derive(Debug)]
pub enum HornerErr {
    InvalidSelection(String),
    KernelUnavailable { family: Family, kind: KernelKind },
    EmptyCoefficients,
    EmptyPoints,
    Spawn(io::Error),
}

impl Display for HornerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HornerErr::InvalidSelection(name) => write!(
                f,
                "invalid implementation {name:?}, the available ones are {:?} and {:?}",
                Family::Primary.name(),
                Family::Alternate.name()
            ),
            HornerErr::KernelUnavailable { family, kind } => {
                write!(f, "the {kind} kernel of the {family} implementation is not bound")
            }
            HornerErr::EmptyCoefficients => f.write_str("the coefficient sequence is empty"),
            HornerErr::EmptyPoints => f.write_str("the point sequence is empty"),
            HornerErr::Spawn(e) => write!(f, "failed to spawn an evaluation thread: {e}"),
        }
    }
}

impl Error for HornerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HornerErr::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
