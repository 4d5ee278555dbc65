//! Count-rate extraction from diamond-detector event logs.
//!
//! An event log is a delimited text file with one detected pulse per line.
//! Pulse arrival times are recorded in picoseconds and energies in detector
//! channels; the columns holding each are configurable.

mod processor;
mod rate;
mod run;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

pub use processor::{CountRates, DataProcessor};
pub use rate::{AverageRate, EnergyWindow, average_rate};
pub use run::{DetectorRun, RunConfig, process_directory};

const PICOSECONDS_PER_SECOND: f64 = 1e12;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed event log {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("delimiter {0:?} is not a single-byte character")]
    InvalidDelimiter(char),

    #[error("{}:{line}: expected at least {expected} columns, found {found}", .path.display())]
    MissingColumn {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}:{line}: invalid number {value:?}", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("binning needs at least two events, found {found}")]
    TooFewEvents { found: usize },

    #[error("bin time must be finite and positive, got {0}")]
    InvalidBinTime(f64),

    #[error("time window must satisfy t_min < t_max, got [{t_min}, {t_max})")]
    InvalidTimeWindow { t_min: f64, t_max: f64 },

    #[error("energy window must satisfy min < max, got ({min}, {max})")]
    InvalidEnergyWindow { min: f64, max: f64 },
}

/// How to read an event log.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadOptions {
    pub delimiter: char,
    pub time_column: usize,
    pub energy_column: usize,

    /// Convert times from picoseconds to seconds.
    pub scale_time: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            time_column: 0,
            energy_column: 1,
            scale_time: true,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_delimiter(self, delimiter: char) -> Self {
        Self { delimiter, ..self }
    }

    #[must_use]
    pub fn with_columns(self, time_column: usize, energy_column: usize) -> Self {
        Self {
            time_column,
            energy_column,
            ..self
        }
    }

    #[must_use]
    pub fn with_scale_time(self, scale_time: bool) -> Self {
        Self { scale_time, ..self }
    }
}

/// Pulse arrival times and energies, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    pub times: Vec<f64>,
    pub energies: Vec<f64>,
}

impl Events {
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Reads pulse times and energies from an event log.
///
/// Blank lines and lines starting with `#` are skipped, and quoted cells
/// are unquoted. Times are converted
/// from picoseconds to seconds when [`ReadOptions::scale_time`] is set.
///
/// # Errors
///
/// Returns [`DetectionError::Io`] if the file cannot be read, and
/// [`DetectionError::MissingColumn`] or [`DetectionError::InvalidNumber`]
/// with the offending line number for malformed rows. A delimiter outside
/// ASCII gives [`DetectionError::InvalidDelimiter`].
pub fn read_time_energy(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Events, DetectionError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| DetectionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let delimiter = u8::try_from(options.delimiter)
        .map_err(|_| DetectionError::InvalidDelimiter(options.delimiter))?;
    let time_scale = if options.scale_time {
        PICOSECONDS_PER_SECOND.recip()
    } else {
        1.0
    };
    let expected = options.time_column.max(options.energy_column) + 1;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut events = Events::default();
    for record in reader.records() {
        let record = record.map_err(|source| DetectionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let line_number = record
            .position()
            .map_or(0, |position| position.line() as usize);
        if record.len() < expected {
            return Err(DetectionError::MissingColumn {
                path: path.to_path_buf(),
                line: line_number,
                expected,
                found: record.len(),
            });
        }

        let parse = |cell: &str| -> Result<f64, DetectionError> {
            cell.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| DetectionError::InvalidNumber {
                    path: path.to_path_buf(),
                    line: line_number,
                    value: cell.to_string(),
                })
        };

        events.times.push(parse(&record[options.time_column])? * time_scale);
        events.energies.push(parse(&record[options.energy_column])?);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_scales_picoseconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "# time,energy\n2e12,1200\n\n5.0e11,900,extra\n").unwrap();

        let events = read_time_energy(&path, &ReadOptions::default()).unwrap();

        assert_eq!(events.times, vec![2.0, 0.5]);
        assert_eq!(events.energies, vec![1200.0, 900.0]);
    }

    #[test]
    fn quoted_cells_are_unquoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "\"1e12\",\"250\",\"pulse, clipped\"\n").unwrap();

        let events = read_time_energy(&path, &ReadOptions::default()).unwrap();

        assert_eq!(events.times, vec![1.0]);
        assert_eq!(events.energies, vec![250.0]);
    }

    #[test]
    fn malformed_rows_report_their_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "1;2\n3;x\n").unwrap();

        let options = ReadOptions::default()
            .with_delimiter(';')
            .with_scale_time(false);
        match read_time_energy(&path, &options) {
            Err(DetectionError::InvalidNumber { line, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "x");
            }
            other => panic!("expected an invalid number, got {other:?}"),
        }

        let short = ReadOptions::default().with_columns(0, 3);
        assert!(matches!(
            read_time_energy(&path, &options.with_delimiter('→')),
            Err(DetectionError::InvalidDelimiter('→'))
        ));
        assert!(matches!(
            read_time_energy(&path, &short),
            Err(DetectionError::MissingColumn {
                line: 1,
                expected: 4,
                ..
            })
        ));
    }
}
