//! In-memory cache of parsed catalog files.
//!
//! Entries are keyed by path and remember the file's modification time; a
//! changed mtime makes the next lookup a miss. The mutex is only held for the
//! map lookup/insert, the parsed sections are shared through `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::models::Section;

#[derive(Debug, Clone)]
struct CachedCatalog {
    modified: SystemTime,
    sections: Arc<Vec<Section>>,
}

#[derive(Debug, Default)]
pub struct SectionCache {
    entries: Mutex<HashMap<PathBuf, CachedCatalog>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// (hits, misses, entries)
pub type CacheStats = (u64, u64, usize);

impl SectionCache {
    pub fn new() -> Self {
        SectionCache::default()
    }

    pub fn get(&self, path: &Path, modified: SystemTime) -> Option<Arc<Vec<Section>>> {
        let guard = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.get(path) {
            Some(entry) if entry.modified == modified => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.sections))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, path: PathBuf, modified: SystemTime, sections: Arc<Vec<Section>>) {
        let mut guard = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(path, CachedCatalog { modified, sections });
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().map(|g| g.len()).unwrap_or(0);
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed), entries)
    }
}
