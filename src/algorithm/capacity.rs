// Seat availability: per section, per combination and per course.
use serde::Serialize;

use crate::models::{AvailabilityStatus, CourseGroups, Enrollment, Section};

/// A section is full when its enrolled count reached its capacity. Missing
/// or malformed counters are read as "not full".
pub fn is_full(section: &Section) -> bool {
    section
        .enrolled
        .as_deref()
        .and_then(Enrollment::parse)
        .map(|e| e.is_full())
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub status: AvailabilityStatus,
    pub full_courses: Vec<String>,
}

/// `Unavailable` as soon as one section of the combination is full.
pub fn classify(sections: &[Section]) -> Availability {
    let full_courses: Vec<String> = sections.iter().filter(|s| is_full(s)).map(|s| s.code.clone()).collect();
    let status = if full_courses.is_empty() {
        AvailabilityStatus::Available
    } else {
        AvailabilityStatus::Unavailable
    };
    Availability { status, full_courses }
}

/// Slot summary for one course before generating anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAvailability {
    pub course_code: String,
    pub sections: usize,
    pub full_sections: Vec<String>,
    /// Sections whose status text says closed or full, whatever the counter says.
    pub flagged_sections: Vec<String>,
    pub open_seats: i64,
}

impl CourseAvailability {
    pub fn has_open_section(&self) -> bool {
        self.full_sections.len() < self.sections
    }
}

pub fn course_availability(groups: &CourseGroups) -> Vec<CourseAvailability> {
    groups
        .iter()
        .map(|group| {
            let mut full_sections = Vec::new();
            let mut flagged_sections = Vec::new();
            let mut open_seats: i64 = 0;
            for s in group.sections.iter() {
                if is_full(s) {
                    full_sections.push(s.code.clone());
                }
                let status = s.status.to_lowercase();
                if status.contains("closed") || status.contains("full") {
                    flagged_sections.push(s.code.clone());
                }
                if let Some(e) = s.enrolled.as_deref().and_then(Enrollment::parse) {
                    open_seats = open_seats.saturating_add(e.open_seats());
                }
            }
            if full_sections.len() == group.sections.len() && !group.sections.is_empty() {
                tracing::warn!(course = %group.code, "every section of the course is full");
            }
            CourseAvailability {
                course_code: group.code.clone(),
                sections: group.sections.len(),
                full_sections,
                flagged_sections,
                open_seats,
            }
        })
        .collect()
}
