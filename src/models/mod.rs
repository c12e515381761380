// Core data structures shared by the engine, the catalog and the API layer.
use chrono::Weekday;
use serde::{Deserialize, Serialize};

mod groups;

pub use groups::{CourseGroup, CourseGroups};

/// Status label the portal uses for cancelled sections.
pub const DISSOLVED_STATUS: &str = "DISSOLVED";

/// One offering (group) of a course as scraped from the portal.
///
/// Only `code`, `schedule`, `enrolled` and `status` are read by the engine;
/// everything else is carried through untouched, including fields this
/// struct does not know about (kept in `extra`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Composite identifier, e.g. `"CIS 2101 - Group 1"`.
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub teacher: String,
    /// Free-form schedule text, possibly `"TBA"`.
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub department: String,
    /// `"N/M"` enrolled over capacity; may be missing or malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Section {
    pub fn new(code: impl Into<String>, schedule: impl Into<String>) -> Self {
        Section {
            code: code.into(),
            description: String::new(),
            status: String::new(),
            teacher: String::new(),
            schedule: schedule.into(),
            room: String::new(),
            department: String::new(),
            enrolled: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_enrolled(mut self, enrolled: impl Into<String>) -> Self {
        self.enrolled = Some(enrolled.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn is_dissolved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(DISSOLVED_STATUS)
    }

    /// Course code without the group suffix.
    pub fn course_code(&self) -> &str {
        base_course_code(&self.code)
    }
}

/// `"CIS 2101 - Group 1"` -> `"CIS 2101"`. Codes without a group suffix are
/// returned whole.
pub fn base_course_code(code: &str) -> &str {
    match code.find(" - Group") {
        Some(pos) => &code[..pos],
        None => code,
    }
}

/// Structured form of a schedule string: the days it meets and the
/// start/end offsets in minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInterval {
    /// May repeat a day when the source token repeats one.
    pub days: Vec<Weekday>,
    pub start: u32,
    pub end: u32,
}

impl ParsedInterval {
    pub fn day_codes(&self) -> String {
        self.days.iter().map(|d| day_code(*d)).collect()
    }
}

/// Single-letter day code used by the portal (`R` is Thursday, `U` Sunday).
pub fn day_code(day: Weekday) -> char {
    match day {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'R',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'U',
    }
}

pub fn weekday_from_code(code: char) -> Option<Weekday> {
    match code.to_ascii_uppercase() {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

/// Seat counts read from a section's `"N/M"` enrolled field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub enrolled: i64,
    pub capacity: i64,
}

impl Enrollment {
    /// `None` when the text is not two integers separated by `/`.
    pub fn parse(text: &str) -> Option<Enrollment> {
        let (enrolled, capacity) = text.split_once('/')?;
        Some(Enrollment {
            enrolled: enrolled.trim().parse().ok()?,
            capacity: capacity.trim().parse().ok()?,
        })
    }

    pub fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    /// Never negative.
    pub fn open_seats(&self) -> i64 {
        self.capacity.saturating_sub(self.enrolled).max(0)
    }
}

/// One section per requested course, in course order.
pub type Combination = Vec<Section>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

/// A combination tagged with whether every section in it still has seats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedCombination {
    pub courses: Combination,
    pub status: AvailabilityStatus,
    /// Composite codes of the full sections, in combination order.
    pub full_courses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_course_code() {
        assert_eq!(base_course_code("CIS 2101 - Group 1"), "CIS 2101");
        assert_eq!(base_course_code("GE-STS - Group 12"), "GE-STS");
        assert_eq!(base_course_code("CIS 2101"), "CIS 2101");
    }

    #[test]
    fn test_section_keeps_unknown_fields() {
        let raw = r#"{
            "code": "CIS 2101 - Group 1",
            "schedule": "MWF 10:00 AM - 11:00 AM",
            "enrolled": "12/40",
            "status": "OPEN",
            "units": 3
        }"#;
        let s: Section = serde_json::from_str(raw).expect("section should deserialize");
        assert_eq!(s.course_code(), "CIS 2101");
        assert_eq!(s.enrolled.as_deref(), Some("12/40"));
        assert_eq!(s.extra.get("units"), Some(&serde_json::json!(3)));

        let back = serde_json::to_value(&s).expect("section should serialize");
        assert_eq!(back["units"], serde_json::json!(3));
        assert_eq!(back["room"], serde_json::json!(""));
    }

    #[test]
    fn test_dissolved_is_case_insensitive() {
        assert!(Section::new("X - Group 1", "TBA").with_status("dissolved").is_dissolved());
        assert!(!Section::new("X - Group 1", "TBA").with_status("OPEN").is_dissolved());
    }

    #[test]
    fn test_day_codes_roundtrip() {
        for c in "MTWRFSU".chars() {
            let day = weekday_from_code(c).expect("known code");
            assert_eq!(day_code(day), c);
        }
        assert_eq!(weekday_from_code('x'), None);
    }
}
