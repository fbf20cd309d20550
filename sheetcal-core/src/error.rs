//! Error types for sheetcal conversions.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::mapping::Field;
use crate::temporal::TemporalError;

/// Errors that can occur while converting a table into a calendar.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input file not found or unreadable: {}: {source}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read table from {}: {reason}", path.display())]
    InputUnreadable { path: PathBuf, reason: String },

    #[error("No data rows in {} (row 1 is the header)", path.display())]
    TableEmpty { path: PathBuf },

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error("{}: {error}", path.display())]
    Row { path: PathBuf, error: RowError },

    #[error("{}: {} rows could not be converted:\n{}", path.display(), errors.len(), RowList(errors))]
    Rows { path: PathBuf, errors: Vec<RowError> },

    #[error("Could not write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for sheetcal operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// A failure scoped to one data row.
///
/// `row` is the 1-based spreadsheet row number (the header is row 1).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {row}, field '{field}': {kind}")]
pub struct RowError {
    pub row: usize,
    pub field: Field,
    #[source]
    pub kind: RowErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    #[error("no column is mapped to this field")]
    MissingField,

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error("event ends before it starts")]
    EndBeforeStart,
}

impl RowError {
    pub fn new(row: usize, field: Field, kind: impl Into<RowErrorKind>) -> Self {
        RowError {
            row,
            field,
            kind: kind.into(),
        }
    }
}

/// Renders a list of row errors one per line.
struct RowList<'a>(&'a [RowError]);

impl fmt::Display for RowList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {error}")?;
        }
        Ok(())
    }
}
