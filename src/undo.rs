//! Single-level undo of the most recent mutating command.
//!
//! - `cp` is reversed by deleting the copy.
//! - `rm -r` is reversed by moving the newest trash entry into the current
//!   directory. The entry is not matched against the recorded target.
//! - `mv` is never reversed automatically; its destination may have
//!   replaced existing content.

use crate::errors::ShellError;
use crate::fs::FileSystem;
use crate::history::HistoryStore;
use crate::models::CommandKind;
use crate::path::PathResolver;
use crate::trash::TrashStore;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    EmptyHistory,
    NothingToUndo,
    RemovedCopy { command: String, path: PathBuf },
    Restored { command: String, name: String, path: PathBuf },
    ManualRestoreRequired { command: String },
}

impl UndoOutcome {
    /// True when history was consumed.
    pub fn reverted(&self) -> bool {
        matches!(self, Self::RemovedCopy { .. } | Self::Restored { .. })
    }
}

impl fmt::Display for UndoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHistory => write!(f, "Nothing to undo: history is empty"),
            Self::NothingToUndo => write!(f, "Nothing to undo"),
            Self::RemovedCopy { command, .. } => write!(f, "Undone: {command}"),
            Self::Restored { name, .. } => write!(f, "Restored: {name}"),
            Self::ManualRestoreRequired { command } => {
                write!(f, "Cannot undo '{command}': mv requires manual restore")
            }
        }
    }
}

/// A history line split into verb, flags and positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordedCommand<'a> {
    kind: Option<CommandKind>,
    recursive: bool,
    operands: Vec<&'a str>,
}

impl<'a> RecordedCommand<'a> {
    fn parse(line: &'a str) -> crate::Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(ShellError::MalformedHistory(line.to_string()));
        }
        let (flags, operands): (Vec<&str>, Vec<&str>) =
            tokens[1..].iter().copied().partition(|token| token.starts_with('-'));
        Ok(Self {
            kind: CommandKind::from_verb(tokens[0]),
            recursive: flags.iter().any(|flag| flag.contains('r')),
            operands,
        })
    }
}

pub struct UndoEngine<'a> {
    fs: &'a dyn FileSystem,
    resolver: &'a PathResolver,
    trash: &'a TrashStore,
}

impl<'a> UndoEngine<'a> {
    pub fn new(fs: &'a dyn FileSystem, resolver: &'a PathResolver, trash: &'a TrashStore) -> Self {
        Self {
            fs,
            resolver,
            trash,
        }
    }

    /// Reverses the newest history entry, popping it only when something was reverted.
    pub fn undo(
        &self,
        history: &mut HistoryStore,
        current_dir: &Path,
    ) -> crate::Result<UndoOutcome> {
        let Some(line) = history.last().map(str::to_string) else {
            return Ok(UndoOutcome::EmptyHistory);
        };
        let recorded = match RecordedCommand::parse(&line) {
            Ok(recorded) => recorded,
            Err(err) => {
                log::debug!("{err}");
                return Ok(UndoOutcome::NothingToUndo);
            }
        };

        let outcome = match recorded.kind {
            Some(CommandKind::Copy) => self.undo_copy(&line, &recorded, current_dir)?,
            Some(CommandKind::Move) => {
                return Ok(UndoOutcome::ManualRestoreRequired {
                    command: line.clone(),
                });
            }
            Some(CommandKind::Remove) if recorded.recursive => {
                self.undo_remove(&line, current_dir)?
            }
            _ => UndoOutcome::NothingToUndo,
        };

        if outcome.reverted() {
            history.pop(self.fs);
        }
        Ok(outcome)
    }

    fn undo_copy(
        &self,
        line: &str,
        recorded: &RecordedCommand<'_>,
        current_dir: &Path,
    ) -> crate::Result<UndoOutcome> {
        let [src, dst] = recorded.operands[..] else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        let mut copy = self.resolver.resolve(dst, current_dir);
        // A plain file copied onto a directory landed inside it.
        if !recorded.recursive && self.fs.is_dir(&copy) {
            match Path::new(src).file_name() {
                Some(name) => copy.push(name),
                None => return Ok(UndoOutcome::NothingToUndo),
            }
        }
        if !self.fs.exists(&copy) {
            return Ok(UndoOutcome::NothingToUndo);
        }

        if self.fs.is_dir(&copy) {
            self.fs.remove_tree(&copy)?;
        } else {
            self.fs.remove_file(&copy)?;
        }
        Ok(UndoOutcome::RemovedCopy {
            command: line.to_string(),
            path: copy,
        })
    }

    fn undo_remove(&self, line: &str, current_dir: &Path) -> crate::Result<UndoOutcome> {
        let Some(item) = self.trash.latest(self.fs)? else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        let path = self.trash.restore(self.fs, &item, current_dir)?;
        Ok(UndoOutcome::Restored {
            command: line.to_string(),
            name: item.original_name,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use tempfile::tempdir;

    struct Fixture {
        _temp: tempfile::TempDir,
        cwd: PathBuf,
        resolver: PathResolver,
        trash: TrashStore,
        history: HistoryStore,
    }

    fn fixture() -> Fixture {
        let temp = tempdir().expect("tempdir");
        let cwd = temp.path().join("work");
        fs::create_dir_all(&cwd).unwrap();
        Fixture {
            resolver: PathResolver::new(temp.path()),
            trash: TrashStore::new(temp.path().join(".trash")),
            history: HistoryStore::new(temp.path().join(".history"), 100),
            cwd,
            _temp: temp,
        }
    }

    impl Fixture {
        fn undo(&mut self) -> UndoOutcome {
            UndoEngine::new(&RealFileSystem, &self.resolver, &self.trash)
                .undo(&mut self.history, &self.cwd)
                .expect("undo")
        }
    }

    #[test]
    fn empty_history_reports_and_keeps_state() {
        let mut fx = fixture();
        assert_eq!(fx.undo(), UndoOutcome::EmptyHistory);
    }

    #[test]
    fn short_entry_is_nothing_to_undo() {
        let mut fx = fixture();
        fx.history.append(&RealFileSystem, "rm notes.txt");
        assert_eq!(fx.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(fx.history.entries().len(), 1);
    }

    #[test]
    fn copy_is_reversed_by_deleting_destination() {
        let mut fx = fixture();
        fs::write(fx.cwd.join("a.txt"), "x").unwrap();
        fs::write(fx.cwd.join("b.txt"), "x").unwrap();
        fx.history.append(&RealFileSystem, "cp a.txt b.txt");

        let outcome = fx.undo();
        assert!(matches!(outcome, UndoOutcome::RemovedCopy { .. }));
        assert!(!fx.cwd.join("b.txt").exists());
        assert!(fx.cwd.join("a.txt").exists());
        assert!(fx.history.is_empty());
    }

    #[test]
    fn file_copied_into_directory_removes_only_the_copy() {
        let mut fx = fixture();
        fs::create_dir(fx.cwd.join("dest")).unwrap();
        fs::write(fx.cwd.join("dest/keep.txt"), "keep").unwrap();
        fs::write(fx.cwd.join("dest/a.txt"), "copy").unwrap();
        fx.history.append(&RealFileSystem, "cp a.txt dest");

        fx.undo();
        assert!(!fx.cwd.join("dest/a.txt").exists());
        assert!(fx.cwd.join("dest/keep.txt").exists());
    }

    #[test]
    fn missing_copy_keeps_history() {
        let mut fx = fixture();
        fx.history.append(&RealFileSystem, "cp a.txt gone.txt");
        assert_eq!(fx.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(fx.history.last(), Some("cp a.txt gone.txt"));
    }

    #[test]
    fn move_needs_manual_restore() {
        let mut fx = fixture();
        fx.history.append(&RealFileSystem, "mv a b");
        let outcome = fx.undo();
        assert!(matches!(outcome, UndoOutcome::ManualRestoreRequired { .. }));
        assert_eq!(fx.history.last(), Some("mv a b"));
    }

    #[test]
    fn remove_restores_newest_trash_entry_into_cwd() {
        let mut fx = fixture();
        let victim = fx.cwd.join("old_stuff");
        fs::create_dir(&victim).unwrap();
        fs::write(victim.join("f"), "payload").unwrap();
        fx.trash.put(&RealFileSystem, &victim).unwrap();
        fx.history.append(&RealFileSystem, "rm -r old_stuff");

        let outcome = fx.undo();
        assert!(matches!(&outcome, UndoOutcome::Restored { name, .. } if name == "old_stuff"));
        assert_eq!(fs::read_to_string(victim.join("f")).unwrap(), "payload");
        assert!(fx.history.is_empty());
    }

    #[test]
    fn remove_without_recursive_flag_leaves_trash_alone() {
        let mut fx = fixture();
        let older = fx.cwd.join("older");
        fs::create_dir(&older).unwrap();
        fx.trash.put(&RealFileSystem, &older).unwrap();
        fx.history.append(&RealFileSystem, "rm my notes.txt");

        assert_eq!(fx.undo(), UndoOutcome::NothingToUndo);
        assert!(!older.exists());
        assert_eq!(fx.history.last(), Some("rm my notes.txt"));
    }

    #[test]
    fn remove_with_empty_trash_is_nothing_to_undo() {
        let mut fx = fixture();
        fx.history.append(&RealFileSystem, "rm -r ghost");
        assert_eq!(fx.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(fx.history.entries().len(), 1);
    }

    #[test]
    fn unknown_verb_is_nothing_to_undo() {
        let mut fx = fixture();
        fx.history.append(&RealFileSystem, "zip src out.zip");
        assert_eq!(fx.undo(), UndoOutcome::NothingToUndo);
    }
}
