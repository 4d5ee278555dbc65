//! Reader for liquid scintillation counter (LSC) exports.
//!
//! An export starts with free-form metadata lines. The data table begins at
//! the first line starting with `S#`, which holds the comma-separated column
//! names; every following non-empty record is one vial. Cells may be quoted.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use libra_core::units::{Activity, becquerels};
use log::info;
use thiserror::Error;

const DATA_MARKER: &str = "S#";

#[derive(Debug, Error)]
pub enum LscError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no line starting with \"S#\" in {}", .path.display())]
    MissingDataMarker { path: PathBuf },

    #[error("unknown column {name:?}")]
    UnknownColumn { name: String },

    #[error("invalid value {value:?} in column {column:?}, row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("malformed table")]
    Csv(#[from] csv::Error),

    #[error("{labels} vial labels given for {rows} rows; use None for missing vials")]
    LabelCountMismatch { labels: usize, rows: usize },
}

/// A parsed LSC export.
#[derive(Debug, Clone, PartialEq)]
pub struct LscFile {
    header: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LscFile {
    /// Reads and parses the export at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LscError::Io`] if the file cannot be read, and
    /// [`LscError::MissingDataMarker`] or [`LscError::RaggedRow`] if it is
    /// not a valid export.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LscError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LscError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file = Self::parse(&contents).ok_or_else(|| LscError::MissingDataMarker {
            path: path.to_path_buf(),
        })??;

        info!("read {} vials from {}", file.rows.len(), path.display());
        Ok(file)
    }

    /// Parses an export, or returns `None` if it has no data marker.
    fn parse(contents: &str) -> Option<Result<Self, LscError>> {
        let mut offset = 0;
        for line in contents.split_inclusive('\n') {
            if line.starts_with(DATA_MARKER) {
                let (header, table) = contents.split_at(offset);
                return Some(Self::parse_table(header, table));
            }
            offset += line.len();
        }
        None
    }

    fn parse_table(header: &str, table: &str) -> Result<Self, LscError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(table.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            if record.len() != columns.len() {
                return Err(LscError::RaggedRow {
                    row: rows.len(),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            header: header.to_string(),
            columns,
            rows,
        })
    }

    /// Metadata lines above the data table, verbatim.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of vials in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the raw cells of a column.
    ///
    /// # Errors
    ///
    /// Returns [`LscError::UnknownColumn`] if the table has no such column.
    pub fn raw_column(&self, name: &str) -> Result<Vec<&str>, LscError> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Returns a numeric column.
    ///
    /// # Errors
    ///
    /// Returns [`LscError::UnknownColumn`] if the table has no such column,
    /// and [`LscError::InvalidValue`] if a cell is not a number.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, LscError> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = &cells[index];
                cell.parse().map_err(|_| LscError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: cell.clone(),
                })
            })
            .collect()
    }

    /// Activity of every vial, from the `Bq:1` column.
    ///
    /// # Errors
    ///
    /// Returns an [`LscError`] if the column is missing or malformed.
    pub fn bq1_values(&self) -> Result<Vec<Activity>, LscError> {
        Ok(self
            .column("Bq:1")?
            .into_iter()
            .map(becquerels)
            .collect())
    }

    /// Counting time of every vial, from the `Count Time` column.
    ///
    /// # Errors
    ///
    /// Returns an [`LscError`] if the column is missing or malformed.
    pub fn count_times(&self) -> Result<Vec<f64>, LscError> {
        self.column("Count Time")
    }

    /// Luminescence of every vial, from the `LUM` column.
    ///
    /// # Errors
    ///
    /// Returns an [`LscError`] if the column is missing or malformed.
    pub fn lum(&self) -> Result<Vec<f64>, LscError> {
        self.column("LUM")
    }

    /// Pairs each vial's activity with its label.
    ///
    /// `labels` holds one entry per row in file order; `None` marks a
    /// position without a vial and is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LscError::LabelCountMismatch`] if `labels` and the table
    /// differ in length, or any error from [`LscFile::bq1_values`].
    pub fn bq1_values_with_labels(
        &self,
        labels: &[Option<String>],
    ) -> Result<Vec<(String, Activity)>, LscError> {
        if labels.len() != self.rows.len() {
            return Err(LscError::LabelCountMismatch {
                labels: labels.len(),
                rows: self.rows.len(),
            });
        }

        Ok(labels
            .iter()
            .zip(self.bq1_values()?)
            .filter_map(|(label, value)| label.clone().map(|label| (label, value)))
            .collect())
    }

    fn column_index(&self, name: &str) -> Result<usize, LscError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| LscError::UnknownColumn {
                name: name.to_string(),
            })
    }
}
