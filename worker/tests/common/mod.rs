#![allow(dead_code)]

use std::{fs, path::PathBuf, time::Duration};

use worker::WorkerConfig;

pub const POLL: Duration = Duration::from_millis(2);

/// A request's files laid out in a temporary directory.
pub struct Request {
    pub dir: tempfile::TempDir,
}

impl Request {
    /// Writes the coefficients `1, 2, 3` and the points `0 1 0.25`.
    pub fn new(settings: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let req = Self { dir };

        fs::write(req.path("coeffs.txt"), "1\n2\n3\n").unwrap();
        fs::write(req.path("points.txt"), "0 1 0.25\n").unwrap();
        req.write_settings(settings);
        req
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> PathBuf {
        self.path("config.ini")
    }

    /// Writes `config.ini` with every file setting pointing inside the
    /// request's directory, followed by `settings`.
    pub fn write_settings(&self, settings: &str) {
        let file = |name: &str| self.path(name).display().to_string();
        let text = format!(
            "[Settings]\n\
             output_file = {}\n\
             input_coeffs_file = {}\n\
             input_points_file = {}\n\
             progress_file = {}\n\
             computation_time_file = {}\n\
             {settings}\n",
            file("results.txt"),
            file("coeffs.txt"),
            file("points.txt"),
            file("progress.txt"),
            file("time.txt"),
        );

        fs::write(self.config(), text).unwrap();
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig::new(self.config(), self.dir.path().join("signals")).with_poll(POLL)
    }

    pub fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.path(name)).ok()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}
