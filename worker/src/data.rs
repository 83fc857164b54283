use std::{
    error::Error,
    fmt,
    fs, io,
    path::{Path, PathBuf},
};

/// Errors loading the coefficients or points of a request.
#[derive(Debug)]
pub enum DataErr {
    Io { path: PathBuf, source: io::Error },
    MissingPath(&'static str),
    InvalidCoefficient { line: usize, text: String },
    NoCoefficients,
    InvalidPointRange(String),
    NonPositiveStep(f32),
    StartAfterEnd { start: f32, end: f32 },
    TooManyPoints(f64),
    NoPoints,
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            DataErr::MissingPath(key) => write!(f, "setting {key} is missing"),
            DataErr::InvalidCoefficient { line, text } => {
                write!(f, "invalid coefficient at line {line}: {text:?}")
            }
            DataErr::NoCoefficients => write!(f, "the coefficients file is empty"),
            DataErr::InvalidPointRange(text) => {
                write!(f, "expected `start end step`, got {text:?}")
            }
            DataErr::NonPositiveStep(step) => write!(f, "point step must be positive, got {step}"),
            DataErr::StartAfterEnd { start, end } => {
                write!(f, "point range start {start} is past its end {end}")
            }
            DataErr::TooManyPoints(count) => {
                write!(f, "the point range spans {count} points, at most {MAX_POINTS} allowed")
            }
            DataErr::NoPoints => write!(f, "the point range is empty"),
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn read(path: &Path) -> Result<String, DataErr> {
    fs::read_to_string(path).map_err(|source| DataErr::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses one coefficient per line, the first one being the constant term.
pub fn parse_coefficients(text: &str) -> Result<Vec<f32>, DataErr> {
    let coeffs = text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            line.parse().map_err(|_| DataErr::InvalidCoefficient {
                line: i + 1,
                text: line.to_string(),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if coeffs.is_empty() {
        return Err(DataErr::NoCoefficients);
    }

    Ok(coeffs)
}

/// Reads the coefficients file at `path`.
pub fn read_coefficients(path: &Path) -> Result<Vec<f32>, DataErr> {
    parse_coefficients(&read(path)?)
}

/// Upper bound on the points a single range may generate.
pub const MAX_POINTS: usize = 1 << 27;

/// An evenly spaced, inclusive range of evaluation points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRange {
    pub start: f32,
    pub end: f32,
    pub step: f32,
}

impl PointRange {
    /// Parses `start end step`, separated by any whitespace.
    pub fn parse(text: &str) -> Result<Self, DataErr> {
        let invalid = || DataErr::InvalidPointRange(text.trim().to_string());

        let values = text
            .split_whitespace()
            .map(|v| v.parse::<f32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let [start, end, step] = values[..] else {
            return Err(invalid());
        };

        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            return Err(invalid());
        }

        if step <= 0.0 {
            return Err(DataErr::NonPositiveStep(step));
        }

        if start > end {
            return Err(DataErr::StartAfterEnd { start, end });
        }

        let count = ((end as f64 - start as f64) / step as f64).floor() + 1.0;
        if count > MAX_POINTS as f64 {
            return Err(DataErr::TooManyPoints(count));
        }

        Ok(Self { start, end, step })
    }

    /// Generates `start + k * step` for k = 0, 1, ... while the value is
    /// at most `end`.
    pub fn generate(&self) -> Vec<f32> {
        (0usize..)
            .map(|k| self.start + k as f32 * self.step)
            .take_while(|&x| x <= self.end)
            .collect()
    }
}

impl fmt::Display for PointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.start, self.end, self.step)
    }
}

/// Reads the point range file at `path` and generates its points.
pub fn read_points(path: &Path) -> Result<Vec<f32>, DataErr> {
    let points = PointRange::parse(&read(path)?)?.generate();

    if points.is_empty() {
        return Err(DataErr::NoPoints);
    }

    Ok(points)
}

/// Writes one result per line, in point order.
pub fn write_results(path: &Path, results: &[f32]) -> io::Result<()> {
    let text: String = results.iter().map(|r| format!("{r}\n")).collect();
    fs::write(path, text)
}

/// Overwrites `path` with the computation time in seconds.
pub fn write_computation_time(path: &Path, seconds: f64) -> io::Result<()> {
    fs::write(path, seconds.to_string())
}
