// Tags generated combinations with their seat availability.
use serde::Serialize;

use crate::algorithm::capacity::classify;
use crate::algorithm::combinations::{generate_with, Diagnostics, GeneratorOptions};
use crate::error::SchedulerError;
use crate::models::{AnnotatedCombination, Combination, CourseGroups};

pub fn annotate(combination: Combination) -> AnnotatedCombination {
    let availability = classify(&combination);
    AnnotatedCombination {
        courses: combination,
        status: availability.status,
        full_courses: availability.full_courses,
    }
}

pub fn annotate_all(combinations: Vec<Combination>) -> Vec<AnnotatedCombination> {
    combinations.into_iter().map(annotate).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedReport {
    pub combinations: Vec<AnnotatedCombination>,
    pub diagnostics: Diagnostics,
}

/// Generate then annotate: what the API layer returns to the client.
pub fn generate_annotated(
    groups: &CourseGroups,
    options: &GeneratorOptions,
) -> Result<AnnotatedReport, SchedulerError> {
    let report = generate_with(groups, options)?;
    Ok(AnnotatedReport {
        combinations: annotate_all(report.combinations),
        diagnostics: report.diagnostics,
    })
}
