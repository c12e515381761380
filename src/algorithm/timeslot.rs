// Parsing of portal schedule strings ("MWF 10:00 AM - 11:00 AM", "Sat 08:00 - 11:00")
// into the days they meet and start/end offsets in minutes since midnight.
use std::sync::OnceLock;

use chrono::Weekday;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::models::{weekday_from_code, ParsedInterval};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleParseError {
    #[error("unrecognised schedule format: {0:?}")]
    UnknownFormat(String),
    #[error("unknown day token {0:?}")]
    UnknownDay(String),
    #[error("invalid time {0:?}")]
    InvalidTime(String),
}

// [0-9] rather than \d: only ASCII digits are times
const TIME_RANGE: &str = r"\s+([0-9]{1,2}):([0-9]{2})\s*(AM|PM)?\s*-\s*([0-9]{1,2}):([0-9]{2})\s*(AM|PM)?";

/// Full and 3-letter day names, longest first so that a name is never
/// shadowed by one of its own prefixes.
const DAY_NAMES: [(&str, Weekday); 15] = [
    ("WEDNESDAY", Weekday::Wed),
    ("THURSDAY", Weekday::Thu),
    ("SATURDAY", Weekday::Sat),
    ("TUESDAY", Weekday::Tue),
    ("MONDAY", Weekday::Mon),
    ("FRIDAY", Weekday::Fri),
    ("SUNDAY", Weekday::Sun),
    ("MON", Weekday::Mon),
    ("TUE", Weekday::Tue),
    ("WED", Weekday::Wed),
    ("THU", Weekday::Thu),
    ("FRI", Weekday::Fri),
    ("SAT", Weekday::Sat),
    ("SUN", Weekday::Sun),
    ("TH", Weekday::Thu),
];

// "MWF", "TTh", "S" ... followed by the time range
fn letter_days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^([MTWRFSU]+H?){}", TIME_RANGE)).expect("letter-day pattern is valid")
    })
}

// "Sat", "Thursday" ... followed by the time range
fn day_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^([A-Z]+){}", TIME_RANGE)).expect("day-name pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy)]
struct Boundary {
    hour: u32,
    minute: u32,
    meridiem: Option<Meridiem>,
}

impl Boundary {
    fn from_captures(
        caps: &Captures,
        hour: usize,
        minute: usize,
        meridiem: usize,
    ) -> Result<Boundary, ScheduleParseError> {
        let num = |i: usize| -> Result<u32, ScheduleParseError> {
            let text = caps.get(i).map(|m| m.as_str()).unwrap_or_default();
            text.parse::<u32>().map_err(|_| ScheduleParseError::InvalidTime(text.to_string()))
        };
        let meridiem = caps.get(meridiem).map(|m| {
            if m.as_str().eq_ignore_ascii_case("PM") { Meridiem::Pm } else { Meridiem::Am }
        });
        Ok(Boundary { hour: num(hour)?, minute: num(minute)?, meridiem })
    }

    /// `bare_range`: neither end of the range carried AM/PM. In that case
    /// hours 1..=7 are read as afternoon hours.
    fn minutes(&self, bare_range: bool) -> u32 {
        let hour = match self.meridiem {
            Some(Meridiem::Pm) if self.hour < 12 => self.hour + 12,
            Some(Meridiem::Am) if self.hour == 12 => 0,
            Some(_) => self.hour,
            None if bare_range && (1..=7).contains(&self.hour) => self.hour + 12,
            None => self.hour,
        };
        hour * 60 + self.minute
    }
}

fn interval_from(days: Vec<Weekday>, caps: &Captures) -> Result<ParsedInterval, ScheduleParseError> {
    let start = Boundary::from_captures(caps, 2, 3, 4)?;
    let end = Boundary::from_captures(caps, 5, 6, 7)?;
    let bare_range = start.meridiem.is_none() && end.meridiem.is_none();
    Ok(ParsedInterval { days, start: start.minutes(bare_range), end: end.minutes(bare_range) })
}

fn letter_days(token: &str) -> Result<Vec<Weekday>, ScheduleParseError> {
    // "TTH" -> "TR"; a lone trailing H left after that is dropped
    let normalized = token.to_uppercase().replace("TH", "R").replace('H', "");
    normalized
        .chars()
        .map(|c| weekday_from_code(c).ok_or_else(|| ScheduleParseError::UnknownDay(token.to_string())))
        .collect()
}

fn day_from_name(token: &str) -> Option<Weekday> {
    let upper = token.to_uppercase();
    DAY_NAMES.iter().find(|(name, _)| upper.starts_with(name)).map(|(_, day)| *day)
}

/// Strict variant: `Ok(None)` for text that means "no schedule" (empty or
/// TBA), `Err` for text that is present but not understood.
pub fn try_parse_schedule(text: &str) -> Result<Option<ParsedInterval>, ScheduleParseError> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("TBA") {
        return Ok(None);
    }

    if let Some(caps) = letter_days_re().captures(text) {
        let days = letter_days(&caps[1])?;
        return interval_from(days, &caps).map(Some);
    }

    if let Some(caps) = day_name_re().captures(text) {
        let day = day_from_name(&caps[1]).ok_or_else(|| ScheduleParseError::UnknownDay(caps[1].to_string()))?;
        return interval_from(vec![day], &caps).map(Some);
    }

    Err(ScheduleParseError::UnknownFormat(text.to_string()))
}

/// Fail-open parse: anything that is not a recognisable schedule is `None`,
/// and `None` never conflicts with anything.
pub fn parse_schedule(text: &str) -> Option<ParsedInterval> {
    match try_parse_schedule(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(schedule = text, error = %e, "schedule treated as unscheduled");
            None
        }
    }
}

/// 12-hour rendering of a minute offset, e.g. `810` -> `"01:30 PM"`.
pub fn format_minutes(minutes: u32) -> String {
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    let (h12, marker) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{:02}:{:02} {}", h12, minute, marker)
}
