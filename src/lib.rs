//! Core of `minish`, a small interactive file shell.
//!
//! The interesting parts are path resolution, the guard against deleting
//! the root/current/parent directory, and the single-level undo backed by
//! a trash directory. Archive codecs and the filesystem are reached through
//! provider traits so every command can be exercised against a temp dir.

pub mod archive;
pub mod command;
pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod history;
pub mod models;
pub mod oplog;
pub mod path;
pub mod safety;
pub mod search;
pub mod shell;
pub mod trash;
pub mod undo;

pub use archive::{ArchiveProvider, StdArchiver};
pub use command::Command;
pub use config::ShellConfig;
pub use errors::{Result, ShellError};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    build_trash_name,
    sanitize_user_path,
    split_trash_name,
    LOG_TIME_FORMAT,
};
pub use history::{HistoryStore, DEFAULT_HISTORY_LIMIT};
pub use models::{CommandKind, CommandOutput, ShellState, TrashedItem};
pub use oplog::OperationLog;
pub use path::{normalize, PathResolver, PathToken};
pub use safety::is_protected;
pub use shell::{is_affirmative, Confirm, Shell, HELP_TEXT};
pub use trash::TrashStore;
pub use undo::{UndoEngine, UndoOutcome};

/// Re-export a small stable API surface for the binary crate.
pub mod prelude {
    pub use crate::{
        command::Command,
        config::ShellConfig,
        errors::{Result, ShellError},
        fs::{FileSystem, RealFileSystem},
        models::*,
        shell::{is_affirmative, Confirm, Shell},
    };
}
