use std::{
    fs, io,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use log::debug;
use tokio::time;

const EXTENSION: &str = "evt";
const DEFAULT_POLL: Duration = Duration::from_millis(50);

/// How a `NamedEvent` goes back to the non-signaled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reset {
    /// Stays signaled until `reset` is called.
    Manual,
    /// Goes back to non-signaled as soon as a waiter observes it.
    Auto,
}

/// A process-visible, named signal backed by a flag file.
///
/// The event is signaled while `<dir>/<name>.evt` exists. The file may carry a
/// payload, handed to whoever observes the signal.
#[derive(Debug, Clone)]
pub struct NamedEvent {
    name: String,
    path: PathBuf,
    reset: Reset,
    poll: Duration,
}

impl NamedEvent {
    /// Creates a new non-signaled `NamedEvent`, clearing any stale signal.
    ///
    /// # Arguments
    /// * `dir` - The directory the event lives in, created if missing.
    /// * `name` - The event's name.
    /// * `reset` - The event's reset behavior.
    pub fn create(dir: &Path, name: &str, reset: Reset) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let event = Self::open(dir, name, reset);
        event.reset()?;

        debug!("created event {name} at {}", event.path.display());
        Ok(event)
    }

    /// Opens a `NamedEvent` without changing its state.
    ///
    /// # Arguments
    /// * `dir` - The directory the event lives in.
    /// * `name` - The event's name.
    /// * `reset` - The event's reset behavior.
    pub fn open(dir: &Path, name: &str, reset: Reset) -> Self {
        Self {
            name: name.to_string(),
            path: dir.join(format!("{name}.{EXTENSION}")),
            reset,
            poll: DEFAULT_POLL,
        }
    }

    /// Sets how often `wait` checks the signal.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Signals the event with an empty payload.
    pub fn set(&self) -> io::Result<()> {
        self.set_with(&[])
    }

    /// Signals the event carrying `payload`.
    ///
    /// The payload is written aside and renamed into place, waiters never
    /// observe a partially written signal.
    pub fn set_with(&self, payload: &[u8]) -> io::Result<()> {
        let staging = self
            .path
            .with_extension(format!("{EXTENSION}.{}", process::id()));

        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)
    }

    /// Puts the event back in the non-signaled state, a no-op if it already is.
    pub fn reset(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            res => res,
        }
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Waits, indefinitely, until the event is signaled.
    ///
    /// An auto-reset event is reset before returning, a manual-reset one is
    /// left signaled.
    ///
    /// # Returns
    /// The payload the event was signaled with.
    pub async fn wait(&self) -> io::Result<Vec<u8>> {
        loop {
            match tokio::fs::read(&self.path).await {
                Ok(payload) => {
                    if self.reset == Reset::Auto {
                        self.reset()?;
                    }

                    return Ok(payload);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => time::sleep(self.poll).await,
                Err(e) => return Err(e),
            }
        }
    }

    /// Like `wait`, giving up after `timeout`.
    ///
    /// # Returns
    /// The payload, or `None` if the event wasn't signaled in time.
    pub async fn wait_timeout(&self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        match time::timeout(timeout, self.wait()).await {
            Ok(res) => res.map(Some),
            Err(_) => Ok(None),
        }
    }
}
