use serde::{Deserialize, Serialize};

use crate::algorithm::{CourseAvailability, Diagnostics, UnscheduledPolicy};
use crate::error::SchedulerError;
use crate::models::{AnnotatedCombination, Section};

/// Body of `POST /api/schedules/generate`.
///
/// # Expected JSON:
/// ```json
/// {
///   "course_codes": ["CIS 2106N", "GE-STS"],
///   "max_combinations": 500,
///   "json_filename": "2nd-Semester_2025_all.json",
///   "unscheduled_policy": "wildcard"
/// }
/// ```
///
/// # Fields:
/// - `course_codes`: base course codes (without the `- Group N` suffix); at least one
/// - `max_combinations`: cap on returned combinations; server default when absent
/// - `json_filename`: catalog file in the data directory; newest file when absent
/// - `unscheduled_policy`: `wildcard` | `exclude` | `reject`; server default when absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSchedulesRequest {
    pub course_codes: Vec<String>,
    #[serde(default)]
    pub max_combinations: Option<usize>,
    #[serde(default)]
    pub json_filename: Option<String>,
    #[serde(default)]
    pub unscheduled_policy: Option<UnscheduledPolicy>,
}

impl GenerateSchedulesRequest {
    /// Checks the request shape and returns the effective cap.
    pub fn validate(&self, default_cap: usize, limit: usize) -> Result<usize, SchedulerError> {
        if self.course_codes.iter().all(|c| c.trim().is_empty()) {
            return Err(SchedulerError::EmptyCourseSelection);
        }
        let cap = self.max_combinations.unwrap_or(default_cap);
        if cap == 0 || cap > limit {
            return Err(SchedulerError::InvalidCap { requested: cap, limit });
        }
        Ok(cap)
    }

    /// Non-blank codes, trimmed, in request order.
    pub fn codes(&self) -> Vec<String> {
        self.course_codes.iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateSchedulesResponse {
    pub combinations: Vec<AnnotatedCombination>,
    /// Seconds, rounded to milliseconds.
    pub generation_time: f64,
    pub count: usize,
    pub cap_reached: bool,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub courses: Vec<Section>,
    pub count: usize,
    pub unique_codes: usize,
    pub last_updated: Option<String>,
}

impl CoursesResponse {
    pub fn empty() -> Self {
        CoursesResponse { courses: Vec::new(), count: 0, unique_codes: 0, last_updated: None }
    }
}

/// Body of `POST /api/schedules/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateCombinationRequest {
    pub sections: Vec<Section>,
}

/// Body of `POST /api/schedules/availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    pub course_codes: Vec<String>,
    #[serde(default)]
    pub json_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub courses: Vec<CourseAvailability>,
    /// Courses where every section is full.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_code: Option<String>,
}

impl From<&SchedulerError> for ErrorResponse {
    fn from(e: &SchedulerError) -> Self {
        ErrorResponse { detail: e.to_string(), error_code: Some(e.error_code().to_string()) }
    }
}

pub fn parse_json_input(json_str: &str) -> Result<GenerateSchedulesRequest, serde_json::Error> {
    serde_json::from_str::<GenerateSchedulesRequest>(json_str)
}
