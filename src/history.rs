//! Persistent log of successful mutating commands (`cp`, `mv`, `rm`).
//!
//! Persistence is best effort: a missing or unreadable file starts an
//! empty history, and a failed save only emits a warning.

use crate::fs::FileSystem;
use std::path::{Path, PathBuf};

/// Entries kept in the history file.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    entries: Vec<String>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
            entries: Vec::new(),
        }
    }

    /// Loads persisted lines, falling back to an empty history on any read failure.
    pub fn load(fs: &dyn FileSystem, path: impl Into<PathBuf>, limit: usize) -> Self {
        let mut store = Self::new(path, limit);
        if !fs.exists(&store.path) {
            return store;
        }
        match fs.read_to_string(&store.path) {
            Ok(content) => {
                store.entries = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Err(err) => log::warn!("ignoring unreadable history file: {err}"),
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn append(&mut self, fs: &dyn FileSystem, command: impl Into<String>) {
        self.entries.push(command.into());
        self.persist(fs);
    }

    /// Removes the newest entry and re-persists.
    pub fn pop(&mut self, fs: &dyn FileSystem) -> Option<String> {
        let popped = self.entries.pop();
        if popped.is_some() {
            self.persist(fs);
        }
        popped
    }

    /// Writes the newest `limit` entries, one per line.
    pub fn save(&self, fs: &dyn FileSystem) -> crate::Result<()> {
        let mut content = self.recent(self.limit).join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs.write_to_string(&self.path, &content)
    }

    /// Like [`HistoryStore::save`], but failures are logged and dropped.
    pub fn persist(&self, fs: &dyn FileSystem) {
        if let Err(err) = self.save(fs) {
            log::warn!("could not save history to {}: {err}", self.path.display());
        }
    }
}
