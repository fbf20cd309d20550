//! Loading event tables from spreadsheets and delimited text.
//!
//! Spreadsheets (xlsx, xlsm, xlsb, xls, ods) are read with calamine, using
//! the first worksheet. `.csv` and `.tsv` files are read with the csv crate.
//! Every cell is rendered to text; the engine never sees typed cells.

use std::fs::File;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};

/// Rows are padded to at least this many cells before field extraction.
pub const MIN_COLUMNS: usize = 5;

/// A fully loaded table. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows, padding every row to the same width
    /// (at least `MIN_COLUMNS`).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(MIN_COLUMNS);

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Table { rows }
    }

    /// Load the table at `path`, picking the reader from the file extension.
    ///
    /// The file handle is released before this returns.
    pub fn load(path: &Path) -> ConvertResult<Self> {
        // Surface missing/unreadable files as such rather than as decode errors.
        File::open(path).map_err(|source| ConvertError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let rows = match extension.as_deref() {
            Some("csv") => read_delimited(path, b',')?,
            Some("tsv") | Some("tab") => read_delimited(path, b'\t')?,
            _ => read_spreadsheet(path)?,
        };

        debug!(path = %path.display(), rows = rows.len(), "loaded table");
        Ok(Table::from_rows(rows))
    }

    /// Header row, if the table has any rows at all.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows with their 1-based spreadsheet row numbers (the header is row 1).
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, row)| (index + 1, row.as_slice()))
    }

    /// Number of cells in every row.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(MIN_COLUMNS, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// True when every cell of the row is blank.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn read_delimited(path: &Path, delimiter: u8) -> ConvertResult<Vec<Vec<String>>> {
    let unreadable = |e: csv::Error| ConvertError::InputUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(unreadable)?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(unreadable)
        })
        .collect()
}

fn read_spreadsheet(path: &Path) -> ConvertResult<Vec<Vec<String>>> {
    let unreadable = |reason: String| ConvertError::InputUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable("workbook has no worksheets".to_string()))?
        .map_err(|e| unreadable(e.to_string()))?;

    // calamine ranges start at the first used cell; pad back to A1 so row
    // numbers match what the user sees.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    Ok(rows)
}

/// Render one spreadsheet cell as text.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => excel_datetime_text(dt.as_f64(), datetime),
            None => float_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Excel stores dates and times as day serials: whole days print as a date,
/// fractions of a single day as a time of day, everything else as both.
fn excel_datetime_text(serial: f64, datetime: NaiveDateTime) -> String {
    if serial < 1.0 {
        // Round to the nearest second; serials carry float noise.
        let seconds = (serial * 86_400.0).round() as u32 % 86_400;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .unwrap_or(NaiveTime::MIN);
        return time.format("%H:%M:%S").to_string();
    }

    if datetime.time().num_seconds_from_midnight() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_are_padded_to_five_columns() {
        let table = Table::from_rows(vec![strings(&["Summary"]), strings(&["Sync", "2024-03-01"])]);
        assert_eq!(table.width(), MIN_COLUMNS);
        let (_, row) = table.data_rows().next().unwrap();
        assert_eq!(row, strings(&["Sync", "2024-03-01", "", "", ""]).as_slice());
    }

    #[test]
    fn rows_share_the_widest_width() {
        let table = Table::from_rows(vec![
            strings(&["a", "b", "c", "d", "e", "f", "g"]),
            strings(&["x"]),
        ]);
        assert!(table.data_rows().all(|(_, row)| row.len() == 7));
    }

    #[test]
    fn data_rows_are_numbered_like_the_spreadsheet() {
        let table = Table::from_rows(vec![
            strings(&["header"]),
            strings(&["first"]),
            strings(&["second"]),
        ]);
        let numbers: Vec<usize> = table.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(is_blank_row(&strings(&["", "  ", ""])));
        assert!(!is_blank_row(&strings(&["", "x"])));
    }

    #[test]
    fn cell_text_renders_plain_values() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Team sync".into())), "Team sync");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Float(2024.0)), "2024");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn excel_serials_render_by_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(excel_datetime_text(45352.0, midnight), "2024-03-01");

        let morning = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(excel_datetime_text(45352.395833, morning), "2024-03-01 09:30:00");

        let base = NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(excel_datetime_text(0.375, base), "09:00:00");
    }

    #[test]
    fn load_reads_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            "Summary,Start Date,Start Time,End Date,End Time\n\
             \"Lunch, with team\",2024-03-01,12:00,2024-03-01,13:00\n\
             Short row,2024-03-02\n"
        )
        .unwrap();
        drop(file);

        let table = Table::load(&path).unwrap();
        assert_eq!(table.len(), 3);
        let rows: Vec<_> = table.data_rows().collect();
        assert_eq!(rows[0].1[0], "Lunch, with team");
        assert_eq!(rows[1].1, strings(&["Short row", "2024-03-02", "", "", ""]).as_slice());
    }

    #[test]
    fn load_reads_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.tsv");
        std::fs::write(&path, "a\tb\nSync\t2024-03-01\n").unwrap();

        let table = Table::load(&path).unwrap();
        let (_, row) = table.data_rows().next().unwrap();
        assert_eq!(row[1], "2024-03-01");
    }

    #[test]
    fn load_reads_xlsx_dates_and_pads_to_a1() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/events.xlsx"));
        let table = Table::load(path).unwrap();

        // Used range is B1:F4, so column A and the blank row 2 are padding.
        assert_eq!(
            table.header().unwrap(),
            strings(&["", "Summary", "Start date", "Start time", "End date", "End time"])
        );

        let rows: Vec<_> = table.data_rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, 2);
        assert!(is_blank_row(rows[0].1));

        assert_eq!(rows[1].0, 3);
        assert_eq!(
            rows[1].1,
            strings(&["", "Launch", "2024-03-01", "09:00:00", "2024-03-01", "10:30:00"])
        );

        assert_eq!(rows[2].0, 4);
        assert_eq!(
            rows[2].1,
            strings(&["", "Review", "2024-03-02 14:00:00", "", "2024-03-02 15:00:00", ""])
        );
    }

    #[test]
    fn load_missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xlsx");
        let err = Table::load(&path).unwrap_err();
        assert!(
            matches!(err, ConvertError::InputNotFound { .. }),
            "Expected InputNotFound, got {err:?}"
        );
        assert!(err.to_string().contains("missing.xlsx"));
    }

    #[test]
    fn load_garbage_spreadsheet_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = Table::load(&path).unwrap_err();
        assert!(
            matches!(err, ConvertError::InputUnreadable { .. }),
            "Expected InputUnreadable, got {err:?}"
        );
    }
}
