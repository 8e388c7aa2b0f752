//! Conversion between the date/time strings people type and the canonical
//! forms Eventica stores and displays.
//!
//! Dates are stored as `DD-MM-YYYY`. Times are display strings such as
//! `9:00am`, `9:00am - 4:30pm` or the `Time TBD` sentinel. Nothing in here
//! guesses: an unparseable value comes back as `None` (or
//! `TimeSlot::Unrecognized`) and the caller decides what to do with it.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EventicaError, EventicaResult};
use crate::event::TIME_TBD;

/// Canonical date format
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Separator between start and end of a time range
pub const RANGE_SEPARATOR: &str = " - ";

static DISPLAY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(am|pm)").expect("valid regex"));

/// A whole input that is already a 12-hour time, e.g. `9:00 PM`
static MERIDIEM_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)$").expect("valid regex")
});

/// What to do when a submitted date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedDatePolicy {
    /// Refuse the request with a `MalformedDate` error
    #[default]
    Reject,
    /// Store today's date instead (legacy behaviour)
    Today,
}

/// Parse a user-supplied date in any accepted input format.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, RFC 3339 date-times,
/// `YYYY-MM-DDTHH:MM[:SS]` and the canonical `DD-MM-YYYY`.
pub fn parse_input_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.date());
        }
    }

    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .or_else(|| parse_date(input))
}

/// Format a user-supplied date as `DD-MM-YYYY`, or `None` if it doesn't parse.
pub fn format_date(input: &str) -> Option<String> {
    parse_input_date(input).map(|d| canonical_date(&d))
}

/// Format a date in canonical `DD-MM-YYYY` form.
pub fn canonical_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Normalize a submitted date, applying `policy` when it is missing or invalid.
pub fn normalize_date(
    input: Option<&str>,
    policy: MalformedDatePolicy,
    today: NaiveDate,
) -> EventicaResult<String> {
    if let Some(formatted) = input.and_then(format_date) {
        return Ok(formatted);
    }

    let shown = input.unwrap_or("<missing>");
    match policy {
        MalformedDatePolicy::Reject => Err(EventicaError::MalformedDate(format!(
            "'{}' is not a recognised date (expected YYYY-MM-DD)",
            shown
        ))),
        MalformedDatePolicy::Today => {
            tracing::warn!(input = shown, "unparseable event date, using today");
            Ok(canonical_date(&today))
        }
    }
}

/// Parse a canonical `DD-MM-YYYY` date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let mut parts = date.trim().split('-');
    let day = parts.next()?.parse::<u32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;

    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert a 24-hour `HH:MM` time into the `H:MMam/pm` display form.
///
/// Empty input becomes `Time TBD`. A 12-hour time such as `09:00 PM` is
/// normalized to `9:00pm`. Input whose hour doesn't parse is returned
/// unchanged.
pub fn format_time_display(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return TIME_TBD.to_string();
    }

    if let Some(caps) = MERIDIEM_TIME.captures(input) {
        return match minutes_since_midnight(input) {
            Some(_) => format!(
                "{}:{}{}",
                caps[1].trim_start_matches('0'),
                &caps[2],
                caps[3].to_ascii_lowercase()
            ),
            None => input.to_string(),
        };
    }

    if minutes_since_midnight(input).is_some() {
        return input.to_string();
    }

    let mut parts = input.split(':');
    let hours = parts.next().unwrap_or_default().trim();
    let minutes = parts.next().filter(|m| !m.is_empty()).unwrap_or("00");

    let Ok(hour) = hours.parse::<u8>() else {
        return input.to_string();
    };

    match hour {
        0 => format!("12:{}am", minutes),
        1..=11 => format!("{}:{}am", hour, minutes),
        12 => format!("12:{}pm", minutes),
        13..=23 => format!("{}:{}pm", hour - 12, minutes),
        _ => input.to_string(),
    }
}

/// Build the display string for an optional start and end time.
pub fn format_time_range(start: Option<&str>, end: Option<&str>) -> String {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    match (start, end) {
        (None, _) => TIME_TBD.to_string(),
        (Some(start), Some(end)) => format!(
            "{}{}{}",
            format_time_display(start),
            RANGE_SEPARATOR,
            format_time_display(end)
        ),
        (Some(start), None) => format_time_display(start),
    }
}

/// Minutes since midnight for an `H:MMam/pm` time, in `0..=1439`.
pub fn minutes_since_midnight(time: &str) -> Option<u16> {
    let caps = DISPLAY_TIME.captures(time)?;
    let hour: u16 = caps[1].parse().ok()?;
    let minute: u16 = caps[2].parse().ok()?;

    if !(1..=12).contains(&hour) || minute >= 60 {
        return None;
    }

    let pm = caps[3].eq_ignore_ascii_case("pm");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    Some(hour * 60 + minute)
}

/// The start of an event's time, as far as it can be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    /// Concrete start, minutes since midnight
    Start(u16),
    /// Explicitly not decided yet
    Tbd,
    /// Some text that isn't a time we understand
    Unrecognized,
}

impl TimeSlot {
    pub fn minutes(&self) -> Option<u16> {
        match self {
            TimeSlot::Start(m) => Some(*m),
            TimeSlot::Tbd | TimeSlot::Unrecognized => None,
        }
    }
}

/// Classify a display time string by its start component.
pub fn classify_time(time: &str) -> TimeSlot {
    let time = time.trim();
    if time.is_empty() || time == TIME_TBD {
        return TimeSlot::Tbd;
    }

    let start = time.split(RANGE_SEPARATOR).next().unwrap_or(time).trim();
    match minutes_since_midnight(start) {
        Some(m) => TimeSlot::Start(m),
        None => TimeSlot::Unrecognized,
    }
}

/// Start of a display time in minutes since midnight.
///
/// `None` for `Time TBD`, empty input, or a start that doesn't parse.
pub fn start_minutes(time: &str) -> Option<u16> {
    classify_time(time).minutes()
}

/// Today's date, in `tz` when given and the system zone otherwise.
pub fn today(tz: Option<&Tz>) -> NaiveDate {
    match tz {
        Some(tz) => Utc::now().with_timezone(tz).date_naive(),
        None => Local::now().date_naive(),
    }
}
