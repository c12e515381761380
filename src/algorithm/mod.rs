// Schedule engine: parsing, conflict testing, seat availability and the
// combination search. Pure computation, no I/O.
pub mod annotate;
pub mod capacity;
pub mod combinations;
pub mod conflict;
pub mod timeslot;

pub use annotate::{annotate, annotate_all, generate_annotated, AnnotatedReport};
pub use capacity::{classify, course_availability, is_full, Availability, CourseAvailability};
pub use combinations::{
    generate, generate_with, Diagnostics, GenerationReport, GeneratorOptions, UnparseableSection, UnscheduledPolicy,
};
pub use conflict::{find_conflict, intervals_conflict, sections_conflict, validate_combination};
pub use timeslot::{format_minutes, parse_schedule, try_parse_schedule, ScheduleParseError};
