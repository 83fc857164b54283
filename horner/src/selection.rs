use std::{
    fmt::{self, Display},
    num::NonZeroUsize,
};

use crate::{error::Result, kernels::Family};

/// One of the four execution modes, given by the vectorized and multithreaded axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scalar,
    Vectorized,
    ScalarMultithreaded,
    VectorizedMultithreaded,
}

impl Mode {
    pub fn is_vectorized(&self) -> bool {
        matches!(self, Mode::Vectorized | Mode::VectorizedMultithreaded)
    }

    pub fn is_multithreaded(&self) -> bool {
        matches!(self, Mode::ScalarMultithreaded | Mode::VectorizedMultithreaded)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Scalar => "scalar/single-threaded",
            Mode::Vectorized => "vectorized/single-threaded",
            Mode::ScalarMultithreaded => "scalar/multithreaded",
            Mode::VectorizedMultithreaded => "vectorized/multithreaded",
        };

        f.write_str(s)
    }
}

/// The strategy used for a single computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub family: Family,
    pub vectorized: bool,
    pub multithreaded: bool,
    pub threads: NonZeroUsize,
}

impl Selection {
    /// Creates a scalar single-threaded `Selection`.
    ///
    /// # Arguments
    /// * `family` - The kernel family to evaluate with.
    pub fn new(family: Family) -> Self {
        Self {
            family,
            vectorized: false,
            multithreaded: false,
            threads: NonZeroUsize::MIN,
        }
    }

    /// Builds a `Selection` out of the family's name.
    ///
    /// # Arguments
    /// * `implementation` - The kernel family's name, `cpp` or `asm`.
    /// * `vectorized` - Whether to evaluate blocks with the vector kernel.
    /// * `multithreaded` - Whether to partition the points across threads.
    /// * `threads` - The amount of threads, ignored unless `multithreaded`.
    ///
    /// # Returns
    /// An `InvalidSelection` error if `implementation` names no family.
    pub fn parse(
        implementation: &str,
        vectorized: bool,
        multithreaded: bool,
        threads: NonZeroUsize,
    ) -> Result<Self> {
        Ok(Self {
            family: implementation.parse()?,
            vectorized,
            multithreaded,
            threads,
        })
    }

    pub fn vectorized(mut self) -> Self {
        self.vectorized = true;
        self
    }

    pub fn multithreaded(mut self, threads: NonZeroUsize) -> Self {
        self.multithreaded = true;
        self.threads = threads;
        self
    }

    /// Returns the execution mode this selection dispatches to.
    pub fn mode(&self) -> Mode {
        match (self.vectorized, self.multithreaded) {
            (false, false) => Mode::Scalar,
            (true, false) => Mode::Vectorized,
            (false, true) => Mode::ScalarMultithreaded,
            (true, true) => Mode::VectorizedMultithreaded,
        }
    }
}
