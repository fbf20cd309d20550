//! Event records built from table rows.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{RowError, RowErrorKind};
use crate::mapping::{ColumnMapping, Field};
use crate::temporal::{TemporalResolver, parse_naive};

/// One calendar event, ready for serialization.
///
/// Records are immutable: fields are only readable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    row: usize,
    summary: String,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl EventRecord {
    pub fn new(row: usize, summary: impl Into<String>, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        EventRecord {
            row,
            summary: summary.into(),
            start,
            end,
        }
    }

    /// 1-based spreadsheet row the event came from.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }
}

/// Raw cell values selected from a row by the mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappedRow<'a> {
    pub summary: &'a str,
    pub start_date: &'a str,
    pub start_time: &'a str,
    pub end_date: &'a str,
    pub end_time: &'a str,
}

impl<'a> MappedRow<'a> {
    /// Pick the five fields out of `row`. Unmapped fields and columns past the
    /// end of the row read as empty text, so short rows behave like padded ones.
    pub fn extract(row: &'a [String], mapping: &ColumnMapping) -> Self {
        let cell = |field: Field| -> &'a str {
            mapping
                .column_for(field)
                .and_then(|column| column.checked_sub(1))
                .and_then(|index| row.get(index))
                .map_or("", |value| value.trim())
        };

        MappedRow {
            summary: cell(Field::EventSummary),
            start_date: cell(Field::StartDate),
            start_time: cell(Field::StartTime),
            end_date: cell(Field::EndDate),
            end_time: cell(Field::EndTime),
        }
    }
}

/// Build the event for one data row.
///
/// `row_number` is the 1-based spreadsheet row, used to label errors.
/// An end equal to the start is accepted; the serializer writes such an
/// event without DTEND.
pub fn build(
    row: &[String],
    row_number: usize,
    mapping: &ColumnMapping,
    resolver: &TemporalResolver,
) -> Result<EventRecord, RowError> {
    for required in [Field::StartDate, Field::EndDate] {
        if mapping.column_for(required).is_none() {
            return Err(RowError::new(row_number, required, RowErrorKind::MissingField));
        }
    }

    let fields = MappedRow::extract(row, mapping);

    let start = resolve_instant(
        resolver,
        fields.start_date,
        fields.start_time,
        row_number,
        (Field::StartDate, Field::StartTime),
    )?;
    let end = resolve_instant(
        resolver,
        fields.end_date,
        fields.end_time,
        row_number,
        (Field::EndDate, Field::EndTime),
    )?;

    if end < start {
        return Err(RowError::new(row_number, Field::EndDate, RowErrorKind::EndBeforeStart));
    }

    debug!(row = row_number, summary = fields.summary, %start, %end, "built event");
    Ok(EventRecord::new(row_number, fields.summary, start, end))
}

/// Resolve one date/time pair, blaming the time field only when the date
/// parses on its own.
fn resolve_instant(
    resolver: &TemporalResolver,
    date: &str,
    time: &str,
    row_number: usize,
    (date_field, time_field): (Field, Field),
) -> Result<DateTime<Tz>, RowError> {
    resolver.resolve(date, time).map_err(|error| {
        let date_alone_ok = !time.is_empty() && parse_naive(date, "", resolver.order).is_ok();
        let field = if date_alone_ok { time_field } else { date_field };
        RowError::new(row_number, field, error)
    })
}
