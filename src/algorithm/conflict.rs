// Conflict detection between parsed schedules and between sections.
use crate::algorithm::timeslot::parse_schedule;
use crate::error::SchedulerError;
use crate::models::{ParsedInterval, Section};

pub const MINUTES_PER_DAY: u32 = 1440;

fn shares_day(a: &ParsedInterval, b: &ParsedInterval) -> bool {
    a.days.iter().any(|d| b.days.contains(d))
}

/// True when both intervals meet on a common day and their times overlap.
///
/// Intervals are half-open: a class ending at 10:00 and one starting at
/// 10:00 do not conflict. An unscheduled side (`None`) never conflicts, and
/// neither do intervals with a boundary outside `0..=1440`.
pub fn intervals_conflict(a: Option<&ParsedInterval>, b: Option<&ParsedInterval>) -> bool {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    if !shares_day(a, b) {
        return false;
    }
    if [a.start, a.end, b.start, b.end].iter().any(|t| *t > MINUTES_PER_DAY) {
        return false;
    }
    a.start < b.end && b.start < a.end
}

pub fn sections_conflict(a: &Section, b: &Section) -> bool {
    intervals_conflict(parse_schedule(&a.schedule).as_ref(), parse_schedule(&b.schedule).as_ref())
}

/// First conflicting pair `(i, j)` with `i < j`, scanning pairs in order.
pub fn find_conflict(sections: &[Section]) -> Option<(usize, usize)> {
    let parsed: Vec<Option<ParsedInterval>> = sections.iter().map(|s| parse_schedule(&s.schedule)).collect();
    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            if intervals_conflict(parsed[i].as_ref(), parsed[j].as_ref()) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Checks a caller-assembled combination. A conflicting pair is a contract
/// violation on the caller's side and is returned as an error.
pub fn validate_combination(sections: &[Section]) -> Result<(), SchedulerError> {
    match find_conflict(sections) {
        Some((i, j)) => Err(SchedulerError::ConflictingSections {
            first: sections[i].code.clone(),
            second: sections[j].code.clone(),
        }),
        None => Ok(()),
    }
}
