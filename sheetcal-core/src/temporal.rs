//! Date/time parsing and time zone localization.
//!
//! Cells hold dates and times in whatever shape the spreadsheet author typed
//! them. The date and time tokens are joined, normalized and matched against a
//! list of common layouts; `fuzzydate` is the fallback for natural phrases.
//! The resulting wall-clock value is then localized into the run's zone.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
};
use chrono_tz::{OffsetComponents, Tz};
use thiserror::Error;

/// Zone used when the caller does not pick one.
pub const DEFAULT_TIME_ZONE: &str = "US/Eastern";

/// Name that resolves to the system time zone.
pub const LOCAL_TIME_ZONE: &str = "local";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemporalError {
    #[error("could not parse date/time \"{input}\"")]
    Parse { input: String },

    #[error("unknown time zone '{zone}'")]
    Zone { zone: String },
}

/// A resolved IANA time zone, applied to every event of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneSpec {
    tz: Tz,
}

impl TimeZoneSpec {
    pub fn new(tz: Tz) -> Self {
        TimeZoneSpec { tz }
    }

    /// Resolve a zone identifier such as `America/New_York`.
    /// `local` resolves to the system zone.
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        let name = name.trim();

        if name.eq_ignore_ascii_case(LOCAL_TIME_ZONE) {
            let system = iana_time_zone::get_timezone().map_err(|_| TemporalError::Zone {
                zone: LOCAL_TIME_ZONE.to_string(),
            })?;
            return Self::parse(&system);
        }

        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| TemporalError::Zone {
                zone: name.to_string(),
            })
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Interpret a wall-clock value as local time in this zone.
    ///
    /// Ambiguous times (clocks going back) resolve to standard time.
    /// Times inside a gap (clocks going forward) use the offset in force
    /// before the gap, so 02:30 in a one-hour gap lands on 03:30.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, latest) => {
                if earliest.offset().dst_offset() == Duration::zero() {
                    earliest
                } else {
                    latest
                }
            }
            LocalResult::None => {
                let before = self.tz.offset_from_utc_datetime(&(naive - Duration::days(1)));
                let utc = naive - Duration::seconds(before.fix().local_minus_utc().into());
                self.tz.from_utc_datetime(&utc)
            }
        }
    }
}

impl Default for TimeZoneSpec {
    fn default() -> Self {
        TimeZoneSpec::new(chrono_tz::US::Eastern)
    }
}

impl FromStr for TimeZoneSpec {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to read all-numeric dates like `01/02/2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// `01/02/2024` is January 2nd.
    #[default]
    MonthFirst,
    /// `01/02/2024` is February 1st.
    DayFirst,
}

/// Turns date and time tokens into zoned instants for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalResolver {
    pub zone: TimeZoneSpec,
    pub order: DateOrder,
}

impl TemporalResolver {
    pub fn new(zone: TimeZoneSpec, order: DateOrder) -> Self {
        TemporalResolver { zone, order }
    }

    pub fn resolve(&self, date: &str, time: &str) -> Result<DateTime<Tz>, TemporalError> {
        let naive = parse_naive(date, time, self.order)?;
        Ok(self.zone.localize(naive))
    }
}

/// Resolve a date and time token into `zone`, reading numeric dates month first.
pub fn resolve(date: &str, time: &str, zone: &TimeZoneSpec) -> Result<DateTime<Tz>, TemporalError> {
    TemporalResolver::new(*zone, DateOrder::MonthFirst).resolve(date, time)
}

const ISO_DATES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

// Two-digit years come first: `%Y` would happily read `24` as year 24.
const MONTH_FIRST_DATES: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y", "%m.%d.%y", "%m.%d.%Y",
];

const DAY_FIRST_DATES: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y",
];

const TEXTUAL_DATES: &[&str] = &["%B %d %Y", "%d %B %Y", "%Y %B %d", "%B-%d-%Y", "%d-%B-%Y"];

const TIMES: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

/// Parse `"{date} {time}"` into a wall-clock value.
///
/// An empty time token means midnight. An empty date token, or one holding
/// only a clock time, is an error. All-numeric dates are only read with the
/// layouts of `order`, never guessed.
pub fn parse_naive(date: &str, time: &str, order: DateOrder) -> Result<NaiveDateTime, TemporalError> {
    let date = date.trim();
    let input = format!("{} {}", date, time.trim()).trim().to_string();

    if date.is_empty() || is_time_only(date) {
        return Err(TemporalError::Parse { input });
    }

    let normalized = normalize(&input);
    if let Some(dt) = parse_with_layouts(&normalized, order) {
        return Ok(dt);
    }

    // fuzzydate reads numeric dates month first whatever the run's order is
    if is_numeric_date(date) {
        return Err(TemporalError::Parse { input });
    }

    fuzzydate::parse(&normalized).map_err(|_| TemporalError::Parse { input })
}

/// `12/31/2024`, `2024-03-01`, `25.12.24`, `20240301`.
fn is_numeric_date(date: &str) -> bool {
    date.bytes().any(|b| b.is_ascii_digit())
        && date
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'/' | b'-' | b'.'))
}

/// A token like `10:00`, `9am` or `noon` that carries no date at all.
fn is_time_only(date: &str) -> bool {
    let normalized = normalize(date);
    TIMES
        .iter()
        .any(|layout| NaiveTime::parse_from_str(&normalized, layout).is_ok())
}

fn date_layouts(input: &str, order: DateOrder) -> impl Iterator<Item = &'static str> {
    let numeric = match order {
        DateOrder::MonthFirst => MONTH_FIRST_DATES,
        DateOrder::DayFirst => DAY_FIRST_DATES,
    };
    // `%Y` also accepts short years, so year-first layouts are only offered
    // when the input really starts with a four digit year.
    let iso: &[&str] = if starts_with_year(input) { ISO_DATES } else { &[] };
    numeric.iter().chain(iso).chain(TEXTUAL_DATES).copied()
}

fn starts_with_year(input: &str) -> bool {
    input.bytes().take_while(u8::is_ascii_digit).count() >= 4
}

fn parse_with_layouts(input: &str, order: DateOrder) -> Option<NaiveDateTime> {
    for date_layout in date_layouts(input, order) {
        if let Ok(date) = NaiveDate::parse_from_str(input, date_layout) {
            return date.and_hms_opt(0, 0, 0);
        }
        for time_layout in TIMES {
            let layout = format!("{date_layout} {time_layout}");
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, &layout) {
                return Some(dt);
            }
        }
    }
    None
}

/// Lowercase, drop commas and weekday names, split `9am` into `9 am`,
/// strip ordinal suffixes, swap `noon`/`midnight` for clock times and give
/// bare meridiem hours their minutes.
fn normalize(input: &str) -> String {
    let lower = input
        .to_lowercase()
        .replace("a.m.", "am")
        .replace("p.m.", "pm")
        .replace(',', " ");

    // ISO `2024-03-01T09:00` separator
    let chars: Vec<char> = lower.chars().collect();
    let spaced: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let between_digits = i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if c == 't' && between_digits { ' ' } else { c }
        })
        .collect();

    let mut words: Vec<String> = Vec::new();
    for word in spaced.split_whitespace() {
        if words.is_empty() && WEEKDAYS.contains(&word) {
            continue;
        }
        match word {
            "noon" => words.push("12:00".to_string()),
            "midnight" => words.push("00:00".to_string()),
            _ => {
                let word = strip_ordinal(word);
                match split_meridiem(word) {
                    Some((clock, meridiem)) => {
                        words.push(clock.to_string());
                        words.push(meridiem.to_string());
                    }
                    None => words.push(word.to_string()),
                }
            }
        }
    }

    // chrono needs minutes, so a bare `9 pm` becomes `9:00 pm`
    for i in 1..words.len() {
        let is_meridiem = words[i] == "am" || words[i] == "pm";
        let prev = &words[i - 1];
        if is_meridiem && (1..=2).contains(&prev.len()) && prev.bytes().all(|b| b.is_ascii_digit()) {
            words[i - 1] = format!("{prev}:00");
        }
    }

    words.join(" ")
}

/// `1st` → `1`, `22nd` → `22`; anything else unchanged.
fn strip_ordinal(word: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = word.strip_suffix(suffix)
            && !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit())
        {
            return number;
        }
    }
    word
}

/// `9am` → (`9`, `am`), `10:30pm` → (`10:30`, `pm`).
fn split_meridiem(word: &str) -> Option<(&str, &str)> {
    ["am", "pm"].into_iter().find_map(|meridiem| {
        let clock = word.strip_suffix(meridiem)?;
        let ends_in_digit = clock.bytes().last().is_some_and(|b| b.is_ascii_digit());
        ends_in_digit.then_some((clock, meridiem))
    })
}
