// Error type shared by the engine, the catalog and the HTTP layer.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("max_combinations must be between 1 and {limit}, got {requested}")]
    InvalidCap { requested: usize, limit: usize },

    #[error("at least one course code is required")]
    EmptyCourseSelection,

    #[error("Course {0} not found in loaded data")]
    CourseNotFound(String),

    /// Raised only under `UnscheduledPolicy::Reject`.
    #[error("unparseable schedules in sections: {}", .0.join(", "))]
    UnparseableSchedules(Vec<String>),

    #[error("sections {first} and {second} conflict")]
    ConflictingSections { first: String, second: String },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {0}")]
    CatalogNotFound(String),

    #[error("No courses data found")]
    NoCourseData,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Stable identifier sent to clients next to the human-readable detail.
    pub fn error_code(&self) -> &'static str {
        match self {
            SchedulerError::InvalidCap { .. } => "invalid_cap",
            SchedulerError::EmptyCourseSelection => "empty_selection",
            SchedulerError::CourseNotFound(_) => "course_not_found",
            SchedulerError::UnparseableSchedules(_) => "unparseable_schedule",
            SchedulerError::ConflictingSections { .. } => "conflicting_sections",
            SchedulerError::InvalidFilename(_) => "invalid_filename",
            SchedulerError::CatalogNotFound(_) => "catalog_not_found",
            SchedulerError::NoCourseData => "no_course_data",
            SchedulerError::Io(_) => "io_error",
            SchedulerError::Json(_) => "json_error",
        }
    }
}
