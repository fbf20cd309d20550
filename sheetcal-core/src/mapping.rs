//! Column-to-field mapping.
//!
//! A `ColumnMapping` says which 1-based spreadsheet column feeds which event
//! field. Header text is never interpreted; it is only shown next to the
//! mapping so whoever builds one can see what each column holds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConvertError, ConvertResult};

/// Semantic event field a column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    EventSummary,
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    Ignore,
}

impl Field {
    /// All tags, in the order they are offered to users.
    pub const ALL: [Field; 6] = [
        Field::EventSummary,
        Field::StartDate,
        Field::StartTime,
        Field::EndDate,
        Field::EndTime,
        Field::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::EventSummary => "event_summary",
            Field::StartDate => "start_date",
            Field::StartTime => "start_time",
            Field::EndDate => "end_date",
            Field::EndTime => "end_time",
            Field::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Field::ALL.iter().map(Field::as_str).collect();
                ConvertError::Config(format!(
                    "Unknown field '{}'. Expected one of: {}",
                    s.trim(),
                    known.join(", ")
                ))
            })
    }
}

/// Mapping from 1-based column index to field.
///
/// Columns without an entry are `Field::Ignore`. When several columns carry
/// the same field, the highest column index wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnMapping {
    columns: BTreeMap<usize, Field>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The positional layout used when no mapping is supplied:
    /// summary, start date, start time, end date, end time.
    pub fn default_layout() -> Self {
        let mut mapping = Self::new();
        mapping.set(1, Field::EventSummary);
        mapping.set(2, Field::StartDate);
        mapping.set(3, Field::StartTime);
        mapping.set(4, Field::EndDate);
        mapping.set(5, Field::EndTime);
        mapping
    }

    /// Assign `field` to `column` (1-based), replacing any previous entry.
    /// Column 0 does not exist, so assigning to it leaves the mapping as is.
    pub fn set(&mut self, column: usize, field: Field) -> &mut Self {
        if column == 0 {
            return self;
        }
        if field == Field::Ignore {
            self.columns.remove(&column);
        } else {
            self.columns.insert(column, field);
        }
        self
    }

    /// Field assigned to `column`; unmapped columns are ignored.
    pub fn field_for(&self, column: usize) -> Field {
        self.columns.get(&column).copied().unwrap_or(Field::Ignore)
    }

    /// Column feeding `field`, if any.
    pub fn column_for(&self, field: Field) -> Option<usize> {
        if field == Field::Ignore {
            return None;
        }
        self.columns
            .iter()
            .rev()
            .find(|(_, f)| **f == field)
            .map(|(column, _)| *column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build a mapping from `(column reference, field tag)` pairs,
    /// e.g. `("A", "event_summary")` or `("3", "start_time")`.
    pub fn from_pairs<I, C, F>(pairs: I) -> ConvertResult<Self>
    where
        I: IntoIterator<Item = (C, F)>,
        C: AsRef<str>,
        F: AsRef<str>,
    {
        let mut mapping = Self::new();
        for (column, field) in pairs {
            let column = parse_column_ref(column.as_ref())?;
            mapping.set(column, field.as_ref().parse()?);
        }
        Ok(mapping)
    }

    /// Describe every column of a header row: number, letter, label and
    /// mapped field. Columns beyond the header that are mapped are listed too.
    pub fn describe(&self, header: &[String]) -> Vec<ColumnInfo> {
        let width = header
            .len()
            .max(self.columns.keys().next_back().copied().unwrap_or(0));

        (1..=width)
            .map(|column| ColumnInfo {
                column,
                letter: column_letter(column),
                label: header.get(column - 1).cloned().unwrap_or_default(),
                field: self.field_for(column),
            })
            .collect()
    }
}

/// One line of `ColumnMapping::describe`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub column: usize,
    pub letter: String,
    pub label: String,
    pub field: Field,
}

/// Pick the mapping for a run: the explicit one verbatim, or the default
/// positional layout. The header is accepted for symmetry with callers that
/// show it to users but is not interpreted.
pub fn resolve(_header: Option<&[String]>, explicit: Option<ColumnMapping>) -> ColumnMapping {
    explicit.unwrap_or_else(ColumnMapping::default_layout)
}

/// Parse a column reference: a 1-based number (`3`) or spreadsheet letters
/// (`C`, `aa`).
pub fn parse_column_ref(reference: &str) -> ConvertResult<usize> {
    let reference = reference.trim();
    let invalid = || {
        ConvertError::Config(format!(
            "Invalid column '{reference}'. Use a number starting at 1 or letters like A, B, AA"
        ))
    };

    if reference.is_empty() {
        return Err(invalid());
    }

    if reference.bytes().all(|b| b.is_ascii_digit()) {
        return match reference.parse::<usize>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(n) => Ok(n),
        };
    }

    if reference.bytes().all(|b| b.is_ascii_alphabetic()) {
        let mut n: usize = 0;
        for b in reference.bytes() {
            let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
            n = n
                .checked_mul(26)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(invalid)?;
        }
        return Ok(n);
    }

    Err(invalid())
}

/// Spreadsheet letters for a 1-based column number (1 → A, 27 → AA).
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_positional() {
        let mapping = ColumnMapping::default_layout();
        assert_eq!(mapping.column_for(Field::EventSummary), Some(1));
        assert_eq!(mapping.column_for(Field::StartDate), Some(2));
        assert_eq!(mapping.column_for(Field::StartTime), Some(3));
        assert_eq!(mapping.column_for(Field::EndDate), Some(4));
        assert_eq!(mapping.column_for(Field::EndTime), Some(5));
        assert_eq!(mapping.field_for(6), Field::Ignore);
    }

    #[test]
    fn resolve_prefers_explicit_mapping() {
        let explicit = ColumnMapping::from_pairs([
            ("1", "start_date"),
            ("2", "start_time"),
            ("3", "event_summary"),
            ("4", "end_date"),
            ("5", "end_time"),
        ])
        .unwrap();
        let resolved = resolve(None, Some(explicit.clone()));
        assert_eq!(resolved, explicit);
        assert_eq!(resolved.column_for(Field::EventSummary), Some(3));
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let header = vec!["Title".to_string(), "Date".to_string()];
        assert_eq!(
            resolve(Some(&header), None),
            ColumnMapping::default_layout()
        );
    }

    #[test]
    fn duplicate_field_highest_column_wins() {
        let mapping =
            ColumnMapping::from_pairs([("2", "start_date"), ("7", "start_date")]).unwrap();
        assert_eq!(mapping.column_for(Field::StartDate), Some(7));
    }

    #[test]
    fn column_zero_is_never_mapped() {
        let mut mapping = ColumnMapping::new();
        mapping.set(0, Field::EventSummary);
        assert!(mapping.is_empty());
        assert_eq!(mapping.field_for(0), Field::Ignore);
    }

    #[test]
    fn ignore_removes_entry() {
        let mut mapping = ColumnMapping::default_layout();
        mapping.set(3, Field::Ignore);
        assert_eq!(mapping.column_for(Field::StartTime), None);
        assert_eq!(mapping.column_for(Field::Ignore), None);
    }

    #[test]
    fn field_tags_parse_case_insensitively() {
        assert_eq!("Ignore".parse::<Field>().unwrap(), Field::Ignore);
        assert_eq!(" END_TIME ".parse::<Field>().unwrap(), Field::EndTime);
        assert!("location".parse::<Field>().is_err());
    }

    #[test]
    fn column_refs_accept_numbers_and_letters() {
        assert_eq!(parse_column_ref("3").unwrap(), 3);
        assert_eq!(parse_column_ref("A").unwrap(), 1);
        assert_eq!(parse_column_ref("z").unwrap(), 26);
        assert_eq!(parse_column_ref("AA").unwrap(), 27);
        assert!(parse_column_ref("0").is_err());
        assert!(parse_column_ref("").is_err());
        assert!(parse_column_ref("A1").is_err());
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn describe_lists_header_labels_with_fields() {
        let header: Vec<String> = ["Title", "Day", "From", "Until Day", "Until", "Notes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let info = ColumnMapping::default_layout().describe(&header);
        assert_eq!(info.len(), 6);
        assert_eq!(info[0].label, "Title");
        assert_eq!(info[0].field, Field::EventSummary);
        assert_eq!(info[5].letter, "F");
        assert_eq!(info[5].field, Field::Ignore);
    }

    #[test]
    fn describe_covers_mapped_columns_past_header() {
        let info = ColumnMapping::default_layout().describe(&["Only".to_string()]);
        assert_eq!(info.len(), 5);
        assert_eq!(info[4].label, "");
        assert_eq!(info[4].field, Field::EndTime);
    }
}
