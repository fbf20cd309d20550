//! One conversion run: load the table, build an event per row, render the
//! calendar and write it atomically.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ConvertError, ConvertResult, RowError};
use crate::event;
use crate::ics::CalendarDocument;
use crate::mapping::{self, ColumnMapping};
use crate::table::{Table, is_blank_row};
use crate::temporal::{DateOrder, TemporalResolver, TimeZoneSpec};

/// What to do when a data row cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Stop at the first bad row and write nothing.
    #[default]
    Abort,
    /// Check every row, report all failures and write nothing if any failed.
    Collect,
    /// Write the good rows and report the bad ones in the run report.
    Skip,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Abort => "abort",
            RunMode::Collect => "collect",
            RunMode::Skip => "skip",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(RunMode::Abort),
            "collect" => Ok(RunMode::Collect),
            "skip" => Ok(RunMode::Skip),
            other => Err(ConvertError::Config(format!(
                "Unknown mode '{other}'. Expected abort, collect or skip"
            ))),
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `None` uses the default positional layout.
    pub mapping: Option<ColumnMapping>,
    pub zone: TimeZoneSpec,
    pub order: DateOrder,
    pub mode: RunMode,
}

impl ConvertOptions {
    /// Options with the default zone, date order, mapping and mode.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        ConvertOptions {
            input: input.into(),
            output: output.into(),
            mapping: None,
            zone: TimeZoneSpec::default(),
            order: DateOrder::default(),
            mode: RunMode::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertReport {
    pub output: PathBuf,
    /// Number of VEVENTs written.
    pub events: usize,
    /// Fully blank data rows that were passed over.
    pub skipped_blank: usize,
    /// Rows left out in skip mode. Always empty in the other modes.
    pub skipped: Vec<RowError>,
}

/// Convert `options.input` into an ICS file at `options.output`.
///
/// The destination is only created or replaced when the run succeeds.
pub fn convert(options: &ConvertOptions) -> ConvertResult<ConvertReport> {
    let input = options.input.as_path();
    debug!(input = %input.display(), zone = %options.zone, mode = %options.mode, "starting conversion");

    let table = Table::load(input)?;
    let mapping = mapping::resolve(table.header(), options.mapping.clone());
    let resolver = TemporalResolver::new(options.zone, options.order);

    let mut document = CalendarDocument::new();
    let mut failures = Vec::new();
    let mut skipped_blank = 0;

    for (row_number, row) in table.data_rows() {
        if is_blank_row(row) {
            debug!(row = row_number, "skipping blank row");
            skipped_blank += 1;
            continue;
        }

        match event::build(row, row_number, &mapping, &resolver) {
            Ok(record) => document.append(record),
            Err(error) => match options.mode {
                RunMode::Abort => {
                    return Err(ConvertError::Row {
                        path: input.to_path_buf(),
                        error,
                    });
                }
                RunMode::Collect => failures.push(error),
                RunMode::Skip => {
                    warn!(path = %input.display(), "skipping {error}");
                    failures.push(error);
                }
            },
        }
    }

    if document.is_empty() && failures.is_empty() {
        return Err(ConvertError::TableEmpty {
            path: input.to_path_buf(),
        });
    }

    if options.mode == RunMode::Collect && !failures.is_empty() {
        return Err(ConvertError::Rows {
            path: input.to_path_buf(),
            errors: failures,
        });
    }

    write_atomically(&options.output, &document.render())?;

    info!(
        output = %options.output.display(),
        events = document.len(),
        skipped = failures.len(),
        blank = skipped_blank,
        "wrote calendar"
    );

    Ok(ConvertReport {
        output: options.output.clone(),
        events: document.len(),
        skipped_blank,
        skipped: failures,
    })
}

/// Write `contents` to a temporary file next to `path`, then rename it into
/// place. The temporary file is removed if anything fails.
fn write_atomically(path: &Path, contents: &[u8]) -> ConvertResult<()> {
    let output_error = |source: std::io::Error| ConvertError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
    file.write_all(contents).map_err(output_error)?;
    file.flush().map_err(output_error)?;
    file.persist(path).map_err(|e| output_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_parses_case_insensitively() {
        assert_eq!("abort".parse::<RunMode>().unwrap(), RunMode::Abort);
        assert_eq!("Collect".parse::<RunMode>().unwrap(), RunMode::Collect);
        assert_eq!(" SKIP ".parse::<RunMode>().unwrap(), RunMode::Skip);
        assert!("retry".parse::<RunMode>().is_err());
    }

    #[test]
    fn default_mode_is_abort() {
        assert_eq!(RunMode::default(), RunMode::Abort);
        assert_eq!(ConvertOptions::new("a.csv", "b.ics").mode, RunMode::Abort);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ics");
        std::fs::write(&path, "old").unwrap();

        write_atomically(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "Temporary file should have been renamed away");
    }

    #[test]
    fn atomic_write_into_missing_directory_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.ics");

        let err = write_atomically(&path, b"data").unwrap_err();
        match err {
            ConvertError::OutputWrite { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("Expected OutputWrite, got {other:?}"),
        }
    }
}
