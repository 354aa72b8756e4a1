use crate::history::DEFAULT_HISTORY_LIMIT;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_FILE: &str = ".history";
pub const DEFAULT_TRASH_DIR: &str = ".trash";
pub const DEFAULT_LOG_FILE: &str = "shell.log";

/// Locations of the files the shell owns, plus the history cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub start_dir: PathBuf,
    pub history_file: PathBuf,
    pub trash_dir: PathBuf,
    pub log_file: PathBuf,
    pub history_limit: usize,
}

impl ShellConfig {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            trash_dir: PathBuf::from(DEFAULT_TRASH_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Applies `MINISH_*` overrides from an environment map.
    pub fn from_environ(start_dir: impl Into<PathBuf>, environ: &HashMap<String, String>) -> Self {
        let mut config = Self::new(start_dir);
        let non_empty = |key: &str| environ.get(key).filter(|value| !value.is_empty());

        if let Some(value) = non_empty("MINISH_HISTORY_FILE") {
            config.history_file = PathBuf::from(value);
        }
        if let Some(value) = non_empty("MINISH_TRASH_DIR") {
            config.trash_dir = PathBuf::from(value);
        }
        if let Some(value) = non_empty("MINISH_LOG_FILE") {
            config.log_file = PathBuf::from(value);
        }
        if let Some(value) = non_empty("MINISH_HISTORY_LIMIT") {
            match value.parse::<usize>() {
                Ok(limit) if limit > 0 => config.history_limit = limit,
                _ => log::warn!("ignoring invalid MINISH_HISTORY_LIMIT={value}"),
            }
        }
        config
    }

    /// Resolves relative file locations against the start directory so a
    /// later `cd` does not move them.
    pub fn anchored(mut self) -> Self {
        self.history_file = anchor(&self.start_dir, &self.history_file);
        self.trash_dir = anchor(&self.start_dir, &self.trash_dir);
        self.log_file = anchor(&self.start_dir, &self.log_file);
        self
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
