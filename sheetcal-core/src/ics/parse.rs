//! Reading generated documents back, using the icalendar crate's parser.

use chrono::DateTime;
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{ConvertError, ConvertResult};
use crate::temporal::TimeZoneSpec;

/// The parts of a VEVENT that a conversion writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub uid: Option<String>,
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Parse every VEVENT of an ICS document, in document order.
pub fn parse_events(content: &str) -> ConvertResult<Vec<ParsedEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| ConvertError::IcsParse(e.to_string()))?;

    calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect()
}

fn parse_event(vevent: &Component) -> ConvertResult<ParsedEvent> {
    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let start = zoned_time(vevent, "DTSTART")?;
    // Without DTEND a date-time event ends when it starts.
    let end = match vevent.find_prop("DTEND") {
        Some(_) => zoned_time(vevent, "DTEND")?,
        None => start,
    };

    Ok(ParsedEvent {
        uid,
        summary,
        start,
        end,
    })
}

fn zoned_time(vevent: &Component, name: &str) -> ConvertResult<DateTime<Tz>> {
    let invalid = |reason: &str| ConvertError::IcsParse(format!("{name}: {reason}"));

    let prop = vevent.find_prop(name).ok_or_else(|| invalid("missing"))?;
    let value = DatePerhapsTime::try_from(prop).map_err(|_| invalid("not a date or date-time"))?;

    match value {
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zone = TimeZoneSpec::parse(&tzid)?;
            Ok(zone.localize(date_time))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Ok(dt.with_timezone(&Tz::UTC)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(_)) => Err(invalid("floating time")),
        DatePerhapsTime::Date(_) => Err(invalid("all-day date")),
    }
}
