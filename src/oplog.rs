use crate::fs::FileSystem;
use crate::helpers::{format_local_time, LOG_TIME_FORMAT};
use std::path::{Path, PathBuf};

/// Append-only record of every attempted command.
///
/// Each attempt produces `[<ts>] <command>`; failures add a second line
/// `[<ts>] ERROR: <message>`. Lines are never rewritten.
#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
}

impl OperationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn success(&self, fs: &dyn FileSystem, command: &str) {
        self.record(fs, command, None);
    }

    pub fn failure(&self, fs: &dyn FileSystem, command: &str, message: &str) {
        self.record(fs, command, Some(message));
    }

    pub fn record(&self, fs: &dyn FileSystem, command: &str, error: Option<&str>) {
        let timestamp = format_local_time(fs.now(), LOG_TIME_FORMAT);
        let mut entry = format!("[{timestamp}] {command}\n");
        if let Some(message) = error {
            entry.push_str(&format!("[{timestamp}] ERROR: {message}\n"));
        }
        if let Err(err) = fs.append(&self.path, &entry) {
            log::warn!("could not write operation log {}: {err}", self.path.display());
        }
    }
}
