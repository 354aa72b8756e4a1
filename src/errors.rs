use std::{io, path::PathBuf};

/// Error type shared by every shell operation.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    /// Source or target does not exist.
    #[error("no such file or directory: {0}")]
    NotFound(PathBuf),

    /// A directory was given where a file operation was requested.
    #[error("is a directory: {0} (use -r for directories)")]
    IsADirectory(PathBuf),

    /// Delete target is the filesystem root, the current directory or its parent.
    #[error("refusing to remove protected directory: {0}")]
    ProtectedPath(PathBuf),

    /// Non-recursive removal of a directory that still has entries.
    #[error("directory not empty: {0}")]
    NotEmpty(PathBuf),

    /// File system I/O failure.
    #[error("I/O error while accessing {0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    /// A history line that cannot be reversed.
    #[error("malformed history entry: {0}")]
    MalformedHistory(String),

    /// Wrong arity, unknown verb or bad flag.
    #[error("invalid command input: {0}")]
    InvalidInput(String),

    /// A destination already exists and would be overwritten.
    #[error("resource conflict: {0}")]
    Conflict(String),

    /// `grep` pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Archive codec failure.
    #[error("archive error: {0}")]
    Archive(String),
}

impl ShellError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn archive(message: impl ToString) -> Self {
        Self::Archive(message.to_string())
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        if error.kind() == io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io(path, error)
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, ShellError>;
