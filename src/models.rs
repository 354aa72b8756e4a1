use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Verb family understood by the shell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandKind {
    List,
    ChangeDir,
    Cat,
    Copy,
    Move,
    Remove,
    Grep,
    Zip,
    Unzip,
    Tar,
    Untar,
    History,
    Undo,
    Help,
    Exit,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "ls",
            Self::ChangeDir => "cd",
            Self::Cat => "cat",
            Self::Copy => "cp",
            Self::Move => "mv",
            Self::Remove => "rm",
            Self::Grep => "grep",
            Self::Zip => "zip",
            Self::Unzip => "unzip",
            Self::Tar => "tar",
            Self::Untar => "untar",
            Self::History => "history",
            Self::Undo => "undo",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    pub fn from_verb(verb: &str) -> Option<Self> {
        let kind = match verb {
            "ls" => Self::List,
            "cd" => Self::ChangeDir,
            "cat" => Self::Cat,
            "cp" => Self::Copy,
            "mv" => Self::Move,
            "rm" => Self::Remove,
            "grep" => Self::Grep,
            "zip" => Self::Zip,
            "unzip" => Self::Unzip,
            "tar" => Self::Tar,
            "untar" => Self::Untar,
            "history" => Self::History,
            "undo" => Self::Undo,
            "help" => Self::Help,
            "exit" => Self::Exit,
            _ => return None,
        };
        Some(kind)
    }

    /// Only these verbs are written to the undo history.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Copy | Self::Move | Self::Remove)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable state of one interactive session.
///
/// `current_dir` changes only through `cd`; the trash directory is fixed
/// for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub current_dir: PathBuf,
    pub trash_dir: PathBuf,
}

impl ShellState {
    pub fn new(current_dir: PathBuf, trash_dir: PathBuf) -> Self {
        Self {
            current_dir,
            trash_dir,
        }
    }
}

/// Rendered result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: Option<CommandKind>,
    pub message: String,
    pub success: bool,
}

impl CommandOutput {
    /// Prefix that marks failed results in user-facing text.
    pub const ERROR_PREFIX: &'static str = "Error: ";

    pub fn success(command: Option<CommandKind>, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
            success: true,
        }
    }

    pub fn with_error(command: Option<CommandKind>, error: impl std::fmt::Display) -> Self {
        Self {
            command,
            message: format!("{}{error}", Self::ERROR_PREFIX),
            success: false,
        }
    }
}

impl std::fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// An entry sitting in the trash directory.
#[derive(Debug, Clone)]
pub struct TrashedItem {
    pub trashed_path: PathBuf,
    pub original_name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TrashedItem {
    pub fn new(trashed_path: PathBuf, original_name: String) -> Self {
        Self {
            trashed_path,
            original_name,
            deleted_at: None,
        }
    }

    pub fn with_deleted_at(mut self, deleted_at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(deleted_at);
        self
    }
}
