use std::{
    collections::HashMap,
    env,
    error::Error,
    fmt, fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use horner::{Family, Selection};
use log::info;

const SECTION: &str = "Settings";

const DEFAULT_CONFIG: &str = "config.ini";
const DEFAULT_TRIGGER: &str = "ComputeEvent";
const DEFAULT_COMPLETION: &str = "CompletionEvent";
const DEFAULT_POLL_MS: u64 = 50;

/// The settings file couldn't be read.
#[derive(Debug)]
pub struct ConfigErr {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read config {}: {}", self.path.display(), self.source)
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Parses INI-style text into a flat `Section.key -> value` map.
///
/// Keys outside of any section are stored as is.
pub fn parse_ini(text: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut section = String::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let key = if section.is_empty() {
            key.to_string()
        } else {
            format!("{section}.{key}")
        };

        entries.insert(key, value.trim().to_string());
    }

    entries
}

/// The per-request settings, read from the settings file every time a
/// request is served.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub implementation: String,
    pub multithreading: bool,
    pub threads: NonZeroUsize,
    pub avx: bool,
    pub save_results: bool,
    pub generate_chart: bool,
    pub output_file: Option<PathBuf>,
    pub coeffs_file: Option<PathBuf>,
    pub points_file: Option<PathBuf>,
    pub progress_file: Option<PathBuf>,
    pub time_file: Option<PathBuf>,
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigErr> {
        let text = fs::read_to_string(path).map_err(|source| ConfigErr {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_ini(&text))
    }

    /// Builds the settings out of INI text, missing keys take their defaults.
    pub fn from_ini(text: &str) -> Self {
        let entries = parse_ini(text);
        let get = |key: &str| entries.get(&format!("{SECTION}.{key}")).map(String::as_str);
        let flag = |key: &str| get(key) == Some("1");
        let path = |key: &str| get(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let threads = get("threads_number")
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            implementation: get("implementation").unwrap_or_default().to_string(),
            multithreading: flag("multithreading"),
            threads,
            avx: flag("avx"),
            save_results: flag("save_results"),
            generate_chart: flag("generate_chart"),
            output_file: path("output_file"),
            coeffs_file: path("input_coeffs_file"),
            points_file: path("input_points_file"),
            progress_file: path("progress_file"),
            time_file: path("computation_time_file"),
        }
    }

    /// Turns the settings into a strategy selection.
    ///
    /// # Errors
    /// `HornerErr::InvalidSelection` if the implementation isn't known.
    pub fn selection(&self) -> horner::Result<Selection> {
        Selection::parse(
            &self.implementation,
            self.avx,
            self.multithreading,
            self.threads,
        )
    }

    /// Renders the settings as the INI text `from_ini` reads back.
    pub fn to_ini(&self) -> String {
        let flag = |on: bool| if on { "1" } else { "0" };
        let path = |p: &Option<PathBuf>| {
            p.as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        format!(
            "[{SECTION}]\n\
             implementation = {}\n\
             multithreading = {}\n\
             threads_number = {}\n\
             avx = {}\n\
             save_results = {}\n\
             generate_chart = {}\n\
             output_file = {}\n\
             input_coeffs_file = {}\n\
             input_points_file = {}\n\
             progress_file = {}\n\
             computation_time_file = {}\n",
            self.implementation,
            flag(self.multithreading),
            self.threads,
            flag(self.avx),
            flag(self.save_results),
            flag(self.generate_chart),
            path(&self.output_file),
            path(&self.coeffs_file),
            path(&self.points_file),
            path(&self.progress_file),
            path(&self.time_file),
        )
    }

    /// Overwrites the settings file at `path`.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_ini())
    }

    pub fn log(&self) {
        info!(
            implementation = self.implementation.as_str(),
            multithreading = self.multithreading,
            threads = self.threads.get(),
            avx = self.avx,
            save_results = self.save_results,
            generate_chart = self.generate_chart;
            "loaded settings"
        );
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            implementation: Family::Primary.name().to_string(),
            multithreading: false,
            threads: NonZeroUsize::MIN,
            avx: false,
            save_results: false,
            generate_chart: false,
            output_file: None,
            coeffs_file: None,
            points_file: None,
            progress_file: None,
            time_file: None,
        }
    }
}

/// Process-wide settings for the worker, fixed at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub config_path: PathBuf,
    pub signal_dir: PathBuf,
    pub trigger: String,
    pub completion: String,
    pub poll: Duration,
}

impl WorkerConfig {
    /// Creates a new worker configuration with the default event names.
    ///
    /// # Args
    /// * `config_path` - The settings file read on every request.
    /// * `signal_dir` - The directory the events live in.
    pub fn new(config_path: PathBuf, signal_dir: PathBuf) -> Self {
        Self {
            config_path,
            signal_dir,
            trigger: DEFAULT_TRIGGER.to_string(),
            completion: DEFAULT_COMPLETION.to_string(),
            poll: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }

    /// Reads the configuration out of the `HORNER_*` environment variables.
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());

        let signal_dir = env::var("HORNER_SIGNAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("horner"));

        let poll = env::var("HORNER_POLL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_MS);

        Self {
            config_path: PathBuf::from(var("HORNER_CONFIG", DEFAULT_CONFIG)),
            signal_dir,
            trigger: var("HORNER_TRIGGER", DEFAULT_TRIGGER),
            completion: var("HORNER_COMPLETION", DEFAULT_COMPLETION),
            poll: Duration::from_millis(poll),
        }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }
}
