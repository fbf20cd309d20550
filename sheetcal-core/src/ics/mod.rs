//! ICS document generation and parsing.
//!
//! Documents are built and read back with the `icalendar` crate, which takes
//! care of TEXT escaping and line folding.

mod generate;
mod parse;

pub use generate::{CalendarDocument, PRODID};
pub use parse::{ParsedEvent, parse_events};
