//! ICS document generation.
//!
//! Events carry `TZID=` parameters with IANA names; no VTIMEZONE components
//! are written. Calendar clients resolve IANA TZIDs on their own.
//!
//! DTEND must be later than DTSTART, so zero-length events are written
//! without DTEND (RFC 5545 §3.6.1: such an event ends when it starts).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Property};
use uuid::Uuid;

use crate::event::EventRecord;

/// Product identifier written into every document.
pub const PRODID: &str = concat!("-//sheetcal//sheetcal ", env!("CARGO_PKG_VERSION"), "//EN");

/// An event together with the identifiers fixed when it was appended.
#[derive(Debug, Clone)]
struct Entry {
    uid: String,
    event: EventRecord,
}

/// A calendar document being assembled for one run.
///
/// Events are appended in input order and rendered once at the end. UIDs and
/// DTSTAMP are fixed when events are appended / the document is created, so
/// rendering is a pure function of the accumulated state.
#[derive(Debug, Clone)]
pub struct CalendarDocument {
    stamp: DateTime<Utc>,
    entries: Vec<Entry>,
}

impl Default for CalendarDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarDocument {
    /// Create an empty document stamped with the current time.
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Create an empty document with an explicit DTSTAMP.
    pub fn with_timestamp(stamp: DateTime<Utc>) -> Self {
        CalendarDocument {
            stamp,
            entries: Vec::new(),
        }
    }

    /// Append one event, assigning it a fresh UID.
    pub fn append(&mut self, event: EventRecord) {
        let uid = format!("{}@sheetcal", Uuid::new_v4());
        self.entries.push(Entry { uid, event });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Events in the order they were appended.
    pub fn events(&self) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Render the document as CRLF-terminated, folded content lines.
    pub fn render(&self) -> Vec<u8> {
        self.render_string().into_bytes()
    }

    pub fn render_string(&self) -> String {
        self.to_calendar().to_string()
    }

    /// Build the `icalendar` representation of the accumulated events.
    fn to_calendar(&self) -> Calendar {
        let mut cal = Calendar::empty();
        cal.append_property(Property::new("VERSION", "2.0"));
        cal.append_property(Property::new("PRODID", PRODID));
        cal.append_property(Property::new("CALSCALE", "GREGORIAN"));

        let dtstamp = self.stamp.format("%Y%m%dT%H%M%SZ").to_string();

        for Entry { uid, event } in &self.entries {
            let mut ics_event = icalendar::Event::new();
            ics_event.uid(uid);
            ics_event.add_property("DTSTAMP", &dtstamp);
            ics_event.summary(&normalize_line_breaks(event.summary()));
            add_zoned_property(&mut ics_event, "DTSTART", event.start());
            if event.end() > event.start() {
                add_zoned_property(&mut ics_event, "DTEND", event.end());
            }
            cal.push(ics_event.done());
        }

        cal.done()
    }
}

/// TEXT values escape line feeds only, so carriage returns become line feeds.
fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// `NAME;TZID=Zone/Name:YYYYMMDDTHHMMSS` in the event's own zone.
fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, time: &DateTime<Tz>) {
    let mut prop = Property::new(name, time.naive_local().format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", time.timezone().name());
    ics_event.append_property(prop);
}
