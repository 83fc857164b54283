use std::{fs, path::PathBuf};

use horner::ProgressSink;
use log::{debug, warn};
use parking_lot::Mutex;

/// Publishes progress percentages by overwriting a file.
///
/// Reports from concurrent evaluation threads are serialized, so the file
/// always holds a single, complete percentage.
#[derive(Debug, Default)]
pub struct FileProgress {
    path: Option<PathBuf>,
    last: Mutex<Option<u32>>,
}

impl FileProgress {
    /// Creates a new `FileProgress`.
    ///
    /// # Arguments
    /// * `path` - The progress file, reports are only logged if `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            last: Mutex::new(None),
        }
    }

    /// Publishes 0%, replacing whatever a previous request left behind.
    pub fn start(&self) {
        *self.last.lock() = Some(0);

        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = fs::write(path, "0") {
            warn!("failed to reset progress in {}: {e}", path.display());
        }
    }

    /// The last percentage reported, if any.
    pub fn last(&self) -> Option<u32> {
        *self.last.lock()
    }
}

impl ProgressSink for FileProgress {
    fn report(&self, percent: u32) {
        let mut last = self.last.lock();

        // Threads may race past each other, never step the file backwards.
        if last.is_some_and(|l| l >= percent) {
            return;
        }
        *last = Some(percent);

        debug!(percent = percent; "progress");

        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = fs::write(path, percent.to_string()) {
            warn!("failed to write progress to {}: {e}", path.display());
        }
    }
}
