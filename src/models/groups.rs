use serde::Serialize;

use crate::error::SchedulerError;
use crate::models::Section;

/// Candidate sections of one course, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseGroup {
    pub code: String,
    pub sections: Vec<Section>,
}

/// Course code -> sections, keeping insertion order of the codes.
///
/// The order of the groups is the branch order of the search, so it has to be
/// stable; a `HashMap` would make the output order depend on hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseGroups {
    groups: Vec<CourseGroup>,
}

impl CourseGroups {
    pub fn new() -> Self {
        CourseGroups { groups: Vec::new() }
    }

    /// Groups raw scraped records by base course code, dropping DISSOLVED
    /// sections. Codes appear in first-seen order.
    pub fn from_sections<I>(sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        let mut out = CourseGroups::new();
        for section in sections {
            if section.is_dissolved() {
                continue;
            }
            let code = section.course_code().to_string();
            out.push_section(code, section);
        }
        out
    }

    /// Sets the sections for `code`. An existing code keeps its position.
    pub fn insert(&mut self, code: impl Into<String>, sections: Vec<Section>) {
        let code = code.into();
        match self.groups.iter_mut().find(|g| g.code == code) {
            Some(g) => g.sections = sections,
            None => self.groups.push(CourseGroup { code, sections }),
        }
    }

    pub fn push_section(&mut self, code: impl Into<String>, section: Section) {
        let code = code.into();
        match self.groups.iter_mut().find(|g| g.code == code) {
            Some(g) => g.sections.push(section),
            None => self.groups.push(CourseGroup { code, sections: vec![section] }),
        }
    }

    pub fn get(&self, code: &str) -> Option<&[Section]> {
        self.groups.iter().find(|g| g.code == code).map(|g| g.sections.as_slice())
    }

    /// Builds the collection the generator runs on: the requested codes in
    /// request order. Repeated codes are kept once.
    pub fn select<S: AsRef<str>>(&self, codes: &[S]) -> Result<CourseGroups, SchedulerError> {
        if codes.is_empty() {
            return Err(SchedulerError::EmptyCourseSelection);
        }
        let mut out = CourseGroups::new();
        for code in codes {
            let code = code.as_ref().trim();
            match self.get(code) {
                Some(sections) => out.insert(code, sections.to_vec()),
                None => return Err(SchedulerError::CourseNotFound(code.to_string())),
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CourseGroup> {
        self.groups.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.code.as_str()).collect()
    }

    pub fn section_count(&self) -> usize {
        self.groups.iter().map(|g| g.sections.len()).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Section>)> for CourseGroups {
    fn from_iter<T: IntoIterator<Item = (K, Vec<Section>)>>(iter: T) -> Self {
        let mut out = CourseGroups::new();
        for (code, sections) in iter {
            out.insert(code, sections);
        }
        out
    }
}

impl<'a> IntoIterator for &'a CourseGroups {
    type Item = &'a CourseGroup;
    type IntoIter = std::slice::Iter<'a, CourseGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
