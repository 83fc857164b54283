use std::io;

use serde::{Deserialize, Serialize};

/// How a computation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Done,
    InvalidSelection,
    KernelUnavailable,
    ConfigError,
    InputError,
}

/// The payload of the completion signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub status: Status,
    /// Seconds the computation took, only present when it ran.
    pub elapsed: Option<f64>,
    /// A human readable reason when the request wasn't served.
    pub detail: Option<String>,
}

impl Completion {
    /// Creates the completion of a computation that ran.
    ///
    /// # Arguments
    /// * `elapsed` - The computation time in seconds.
    pub fn done(elapsed: f64) -> Self {
        Self {
            status: Status::Done,
            elapsed: Some(elapsed),
            detail: None,
        }
    }

    /// Creates the completion of a request that was abandoned.
    ///
    /// # Arguments
    /// * `status` - Why the request was abandoned.
    /// * `detail` - The error that caused it.
    pub fn failed<D: Into<String>>(status: Status, detail: D) -> Self {
        Self {
            status,
            elapsed: None,
            detail: Some(detail.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Serializes the completion into JSON.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserializes a completion out of JSON.
    pub fn from_bytes(buf: &[u8]) -> io::Result<Self> {
        Ok(serde_json::from_slice(buf)?)
    }
}
