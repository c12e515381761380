// Backtracking search that picks exactly one section per course such that no
// two picked sections meet at the same time, stopping at a result cap.
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithm::conflict::intervals_conflict;
use crate::algorithm::timeslot::{try_parse_schedule, ScheduleParseError};
use crate::error::SchedulerError;
use crate::models::{Combination, CourseGroups, ParsedInterval, Section};

/// What to do with a section whose schedule text is present but unreadable.
/// Empty and TBA schedules are always compatible with everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnscheduledPolicy {
    /// Keep the section; it conflicts with nothing.
    #[default]
    Wildcard,
    /// Drop the section before searching.
    Exclude,
    /// Refuse the whole request.
    Reject,
}

impl FromStr for UnscheduledPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wildcard" => Ok(UnscheduledPolicy::Wildcard),
            "exclude" => Ok(UnscheduledPolicy::Exclude),
            "reject" => Ok(UnscheduledPolicy::Reject),
            other => Err(format!("unknown unscheduled policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub max_combinations: usize,
    pub unscheduled: UnscheduledPolicy,
    /// Skip DISSOLVED sections even if the caller forgot to filter them.
    pub skip_dissolved: bool,
}

impl GeneratorOptions {
    pub fn new(max_combinations: usize) -> Self {
        GeneratorOptions { max_combinations, unscheduled: UnscheduledPolicy::Wildcard, skip_dissolved: false }
    }

    pub fn with_policy(mut self, policy: UnscheduledPolicy) -> Self {
        self.unscheduled = policy;
        self
    }

    pub fn with_skip_dissolved(mut self, skip: bool) -> Self {
        self.skip_dissolved = skip;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnparseableSection {
    pub code: String,
    pub schedule: String,
    pub reason: String,
}

/// Non-fatal findings of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub unparseable: Vec<UnparseableSection>,
    pub dissolved_skipped: Vec<String>,
    /// Candidate sections pruned because they clashed with the current path.
    pub rejected_branches: usize,
    /// The search stopped because it hit `max_combinations`; more valid
    /// combinations may exist.
    pub cap_reached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub combinations: Vec<Combination>,
    pub diagnostics: Diagnostics,
}

struct Candidate<'a> {
    section: &'a Section,
    interval: Option<ParsedInterval>,
}

/// Parses every schedule once (memoised per distinct string) and applies
/// the dissolved/unparseable handling. Course order and section order are
/// kept as given.
fn prepare<'a>(
    groups: &'a CourseGroups,
    options: &GeneratorOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Vec<Candidate<'a>>> {
    let mut memo: HashMap<&'a str, Result<Option<ParsedInterval>, ScheduleParseError>> = HashMap::new();
    let mut courses = Vec::with_capacity(groups.len());

    for group in groups.iter() {
        let mut candidates = Vec::with_capacity(group.sections.len());
        for section in group.sections.iter() {
            if options.skip_dissolved && section.is_dissolved() {
                diagnostics.dissolved_skipped.push(section.code.clone());
                continue;
            }
            let parsed = memo
                .entry(section.schedule.as_str())
                .or_insert_with(|| try_parse_schedule(&section.schedule))
                .clone();
            match parsed {
                Ok(interval) => candidates.push(Candidate { section, interval }),
                Err(e) => {
                    tracing::warn!(
                        section = %section.code,
                        schedule = %section.schedule,
                        error = %e,
                        "unparseable schedule"
                    );
                    diagnostics.unparseable.push(UnparseableSection {
                        code: section.code.clone(),
                        schedule: section.schedule.clone(),
                        reason: e.to_string(),
                    });
                    if options.unscheduled != UnscheduledPolicy::Exclude {
                        candidates.push(Candidate { section, interval: None });
                    }
                }
            }
        }
        courses.push(candidates);
    }
    courses
}

fn path_is_consistent(path: &[&Candidate<'_>]) -> bool {
    for i in 0..path.len() {
        for j in (i + 1)..path.len() {
            if intervals_conflict(path[i].interval.as_ref(), path[j].interval.as_ref()) {
                return false;
            }
        }
    }
    true
}

/// Depth-first search with an explicit stack. `next[d]` is the index of the
/// next section to try for course `d`; `path` holds the sections committed
/// for courses `0..path.len()`. The result vector is the only counter and
/// the cap is checked before every step, so the whole search stops as soon
/// as it is full.
fn search(courses: &[Vec<Candidate<'_>>], max_combinations: usize, diagnostics: &mut Diagnostics) -> Vec<Combination> {
    let mut results: Vec<Combination> = Vec::new();
    if courses.is_empty() {
        return results;
    }

    let total = courses.len();
    let mut next = vec![0usize; total];
    let mut path: Vec<&Candidate<'_>> = Vec::with_capacity(total);

    loop {
        if results.len() >= max_combinations {
            diagnostics.cap_reached = true;
            break;
        }

        let depth = path.len();
        if depth == total {
            // revalidate the full path before keeping it
            if path_is_consistent(&path) {
                results.push(path.iter().map(|c| c.section.clone()).collect());
            }
            path.pop();
            continue;
        }

        let options = &courses[depth];
        let mut chosen: Option<&Candidate<'_>> = None;
        while next[depth] < options.len() {
            let candidate = &options[next[depth]];
            next[depth] += 1;
            let blocker = path
                .iter()
                .find(|committed| intervals_conflict(candidate.interval.as_ref(), committed.interval.as_ref()));
            match blocker {
                Some(committed) => {
                    diagnostics.rejected_branches += 1;
                    tracing::debug!(
                        section = %candidate.section.code,
                        schedule = %candidate.section.schedule,
                        conflicted_with = %committed.section.code,
                        "section rejected"
                    );
                }
                None => {
                    chosen = Some(candidate);
                    break;
                }
            }
        }

        match chosen {
            Some(candidate) => {
                path.push(candidate);
                if path.len() < total {
                    next[path.len()] = 0;
                }
            }
            None => {
                // course at this depth is exhausted: undo the previous pick
                if path.pop().is_none() {
                    break;
                }
            }
        }
    }

    results
}

/// Every conflict-free way of picking one section per course, in branch
/// order, at most `max_combinations` of them. Unreadable schedules are
/// treated as compatible with everything.
pub fn generate(groups: &CourseGroups, max_combinations: usize) -> Vec<Combination> {
    let options = GeneratorOptions::new(max_combinations);
    let mut diagnostics = Diagnostics::default();
    let courses = prepare(groups, &options, &mut diagnostics);
    search(&courses, max_combinations, &mut diagnostics)
}

/// Same search as [`generate`] with explicit handling of unreadable and
/// dissolved sections, returning the diagnostics alongside the results.
pub fn generate_with(groups: &CourseGroups, options: &GeneratorOptions) -> Result<GenerationReport, SchedulerError> {
    let mut diagnostics = Diagnostics::default();
    let courses = prepare(groups, options, &mut diagnostics);

    if options.unscheduled == UnscheduledPolicy::Reject && !diagnostics.unparseable.is_empty() {
        let codes = diagnostics.unparseable.iter().map(|u| u.code.clone()).collect();
        return Err(SchedulerError::UnparseableSchedules(codes));
    }

    let combinations = search(&courses, options.max_combinations, &mut diagnostics);
    tracing::info!(
        courses = groups.len(),
        combinations = combinations.len(),
        rejected_branches = diagnostics.rejected_branches,
        cap_reached = diagnostics.cap_reached,
        "schedule combinations generated"
    );
    if combinations.is_empty() && !groups.is_empty() {
        tracing::warn!(courses = groups.len(), "no valid schedules generated");
    }

    Ok(GenerationReport { combinations, diagnostics })
}
