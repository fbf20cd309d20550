//! Conversion engine for sheetcal.
//!
//! This crate turns a table of event rows into an iCalendar document:
//! - `table` loads spreadsheets and delimited text into text cells
//! - `mapping` resolves which column feeds which event field
//! - `temporal` parses date/time text and localizes it into a time zone
//! - `event` builds one `EventRecord` per data row
//! - `ics` renders records into an RFC 5545 document (and reads them back)
//! - `convert` drives a whole run from input file to output file
//! - `config` reads defaults from a TOML file and the environment

pub mod config;
pub mod convert;
pub mod error;
pub mod event;
pub mod ics;
pub mod mapping;
pub mod table;
pub mod temporal;

pub use config::SheetcalConfig;
pub use convert::{ConvertOptions, ConvertReport, RunMode, convert};
pub use error::{ConvertError, ConvertResult, RowError, RowErrorKind};
pub use event::EventRecord;
pub use ics::CalendarDocument;
pub use mapping::{ColumnMapping, Field};
pub use table::Table;
pub use temporal::{DateOrder, TemporalError, TimeZoneSpec};
