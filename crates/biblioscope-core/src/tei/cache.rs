use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::tei::tree::XmlDocument;

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

// ─── TreeCache ──────────────────────────────────────────────────────────────

/// Parsed documents keyed by path, evicting the least recently used entry
/// once `capacity` is reached. A capacity of zero disables caching.
#[derive(Debug)]
pub struct TreeCache {
    capacity: usize,
    entries: HashMap<PathBuf, Rc<XmlDocument>>,
    // Front is least recently used.
    recency: VecDeque<PathBuf>,
    hits: u64,
    misses: u64,
}

impl TreeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_parse(&mut self, path: &Path) -> Result<Rc<XmlDocument>> {
        self.get_or_insert_with(path, XmlDocument::from_file)
    }

    pub fn get_or_insert_with<F>(&mut self, path: &Path, load: F) -> Result<Rc<XmlDocument>>
    where
        F: FnOnce(&Path) -> Result<XmlDocument>,
    {
        if let Some(doc) = self.entries.get(path).cloned() {
            self.hits += 1;
            self.touch(path);
            return Ok(doc);
        }

        self.misses += 1;
        let doc = Rc::new(load(path)?);
        if self.capacity == 0 {
            return Ok(doc);
        }

        while self.entries.len() >= self.capacity {
            let Some(evicted) = self.recency.pop_front() else {
                break;
            };
            debug!(path = %evicted.display(), "evicting cached tree");
            self.entries.remove(&evicted);
        }
        self.entries.insert(path.to_path_buf(), Rc::clone(&doc));
        self.recency.push_back(path.to_path_buf());
        Ok(doc)
    }

    fn touch(&mut self, path: &Path) {
        if let Some(pos) = self.recency.iter().position(|p| p == path) {
            if let Some(entry) = self.recency.remove(pos) {
                self.recency.push_back(entry);
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
