//! Store of scraped section records.
//!
//! The scraper drops one JSON file per scrape (`2nd-Semester_2025_all.json`
//! ...) into the data directory. This module lists those files, picks the
//! newest one when the caller does not name one, and loads/caches the
//! sections they contain.
//!
//! Submodules:
//! - `cache`: parsed-file cache keyed by path and modification time

mod cache;

pub use cache::{CacheStats, SectionCache};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::models::{base_course_code, Section};

/// Accepted layouts of a catalog file: a bare array of sections or an object
/// wrapping them under `courses`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Sections(Vec<Section>),
    Wrapped { courses: Vec<Section> },
}

impl CatalogDocument {
    fn into_sections(self) -> Vec<Section> {
        match self {
            CatalogDocument::Sections(s) => s,
            CatalogDocument::Wrapped { courses } => courses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogFile {
    pub filename: String,
    pub path: String,
    pub size: u64,
    /// RFC 3339, local time.
    pub modified: String,
}

#[derive(Debug)]
pub struct CatalogStore {
    dir: PathBuf,
    cache: SectionCache,
}

fn to_rfc3339(t: SystemTime) -> String {
    DateTime::<Local>::from(t).to_rfc3339()
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("json")).unwrap_or(false)
}

/// A client may only name a file directly inside the data directory.
fn check_bare_filename(filename: &str) -> Result<(), SchedulerError> {
    let path = Path::new(filename);
    let traversal = filename.contains("..") || filename.contains('/') || filename.contains('\\');
    if traversal || path.is_absolute() || path.components().count() != 1 {
        tracing::warn!(filename, "rejected catalog file name");
        return Err(SchedulerError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

impl CatalogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CatalogStore { dir: dir.into(), cache: SectionCache::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the data directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), SchedulerError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn json_entries(&self) -> Result<Vec<(SystemTime, PathBuf, u64)>, SchedulerError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let p = entry.path();
            if !p.is_file() || !is_json(&p) {
                continue;
            }
            let meta = entry.metadata()?;
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.push((modified, p, meta.len()));
        }
        // newest first, name as tie-breaker so listings are stable
        out.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(out)
    }

    /// `*.json` files of the data directory, newest first.
    pub fn list_files(&self) -> Result<Vec<CatalogFile>, SchedulerError> {
        let files = self
            .json_entries()?
            .into_iter()
            .map(|(modified, path, size)| CatalogFile {
                filename: path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string(),
                path: path.to_string_lossy().to_string(),
                size,
                modified: to_rfc3339(modified),
            })
            .collect();
        Ok(files)
    }

    pub fn latest_file(&self) -> Option<PathBuf> {
        match self.json_entries() {
            Ok(entries) => entries.into_iter().next().map(|(_, p, _)| p),
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cannot list catalog directory");
                None
            }
        }
    }

    /// `None` -> newest file. A name coming from a client must be a bare
    /// file name inside the data directory; anything with a separator, a
    /// parent reference or an absolute form is `InvalidFilename`.
    pub fn resolve(&self, filename: Option<&str>) -> Result<PathBuf, SchedulerError> {
        let path = match filename.map(str::trim).filter(|f| !f.is_empty()) {
            None => self.latest_file().ok_or_else(|| SchedulerError::CatalogNotFound(self.dir.display().to_string()))?,
            Some(f) => {
                check_bare_filename(f)?;
                self.dir.join(f)
            }
        };
        if !path.is_file() {
            return Err(SchedulerError::CatalogNotFound(path.display().to_string()));
        }
        Ok(path)
    }

    /// Loads the catalog a client asked for (see [`resolve`](Self::resolve)).
    pub fn load(&self, filename: Option<&str>) -> Result<(PathBuf, Arc<Vec<Section>>), SchedulerError> {
        let path = self.resolve(filename)?;
        let sections = self.load_path(&path)?;
        Ok((path, sections))
    }

    /// Loads the sections of any catalog file, reusing the cached parse
    /// while the file is unchanged. Not for client-supplied paths.
    pub fn load_path(&self, path: &Path) -> Result<Arc<Vec<Section>>, SchedulerError> {
        let modified = fs::metadata(path)?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if let Some(sections) = self.cache.get(path, modified) {
            return Ok(sections);
        }

        tracing::info!(path = %path.display(), "loading courses");
        let text = fs::read_to_string(path)?;
        let doc: CatalogDocument = serde_json::from_str(&text)?;
        let sections = Arc::new(doc.into_sections());
        tracing::info!(path = %path.display(), sections = sections.len(), "loaded courses");

        self.cache.insert(path.to_path_buf(), modified, Arc::clone(&sections));
        Ok(sections)
    }

    /// Like [`load`](Self::load) for an explicit name; only `.json` files.
    pub fn load_named(&self, filename: &str) -> Result<(PathBuf, Arc<Vec<Section>>), SchedulerError> {
        check_bare_filename(filename)?;
        if !is_json(Path::new(filename)) {
            return Err(SchedulerError::CatalogNotFound(filename.to_string()));
        }
        self.load(Some(filename))
    }

    pub fn last_modified(&self, path: &Path) -> Option<String> {
        fs::metadata(path).and_then(|m| m.modified()).ok().map(to_rfc3339)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Number of distinct courses (group suffix stripped) among the sections.
pub fn unique_course_count(sections: &[Section]) -> usize {
    sections.iter().map(|s| base_course_code(&s.code)).collect::<HashSet<_>>().len()
}
