//! Command orchestration: resolves paths, applies the delete guard,
//! performs the effect through the providers, then records history and
//! the operation log.

use crate::archive::{with_extension, ArchiveProvider, StdArchiver, TAR_GZ_EXTENSION, ZIP_EXTENSION};
use crate::command::Command;
use crate::config::ShellConfig;
use crate::errors::ShellError;
use crate::fs::{nests_inside, FileSystem, RealFileSystem};
use crate::helpers::{
    base_name, canonical_or_relaxed, format_local_time, format_permissions, sanitize_user_path,
    LISTING_TIME_FORMAT,
};
use crate::history::HistoryStore;
use crate::models::{CommandKind, CommandOutput, ShellState};
use crate::oplog::OperationLog;
use crate::path::PathResolver;
use crate::safety::is_protected;
use crate::search::{self, GrepOptions};
use crate::trash::TrashStore;
use crate::undo::{UndoEngine, UndoOutcome};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

pub const HELP_TEXT: &str = "\
Available commands:
  ls [-l] [path]                   list directory contents
  cd [path]                        change directory (.., ~)
  cat <file>                       print a file
  cp [-r] <src> <dst>              copy
  mv <src> <dst>                   move or rename
  rm [-r] <path>                   remove (-r moves directories to the trash)

Archives and search:
  zip <dir> <archive.zip>          create a ZIP archive
  unzip <archive.zip>              extract a ZIP archive here
  tar <dir> <archive.tar.gz>       create a TAR.GZ archive
  untar <archive.tar.gz>           extract a TAR.GZ archive here
  grep [-r] [-i] <pattern> <path>  search files

Utilities:
  history [n]                      show the last n cp/mv/rm commands
  undo                             undo the last cp or rm -r
  help                             show this help
  exit                             leave the shell";

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Only `y`/`Y` counts as consent.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

enum Reply {
    /// `history` overrides the text recorded for a mutating command.
    Done { message: String, history: Option<String> },
    Cancelled,
}

impl Reply {
    fn done(message: String) -> Self {
        Self::Done { message, history: None }
    }
}

pub struct Shell {
    fs: Box<dyn FileSystem>,
    archiver: Box<dyn ArchiveProvider>,
    confirm: Box<dyn Confirm>,
    resolver: PathResolver,
    state: ShellState,
    history: HistoryStore,
    trash: TrashStore,
    log: OperationLog,
}

impl Shell {
    /// Opens a shell on the real filesystem.
    pub fn open(config: ShellConfig, confirm: impl Confirm + 'static) -> crate::Result<Self> {
        Self::with_providers(config, Box::new(RealFileSystem), Box::new(StdArchiver), Box::new(confirm))
    }

    pub fn with_providers(
        config: ShellConfig,
        fs: Box<dyn FileSystem>,
        archiver: Box<dyn ArchiveProvider>,
        confirm: Box<dyn Confirm>,
    ) -> crate::Result<Self> {
        let config = config.anchored();
        let home = fs.home_dir().unwrap_or_else(|| config.start_dir.clone());
        let history = HistoryStore::load(fs.as_ref(), &config.history_file, config.history_limit);
        let trash = TrashStore::new(&config.trash_dir);
        trash.ensure(fs.as_ref())?;
        log::debug!(
            "shell started in {} ({} history entries)",
            config.start_dir.display(),
            history.entries().len()
        );

        Ok(Self {
            resolver: PathResolver::new(home),
            state: ShellState::new(config.start_dir.clone(), config.trash_dir.clone()),
            log: OperationLog::new(&config.log_file),
            fs,
            archiver,
            confirm,
            history,
            trash,
        })
    }

    pub fn current_dir(&self) -> &Path {
        &self.state.current_dir
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    pub fn operation_log(&self) -> &OperationLog {
        &self.log
    }

    pub fn resolve(&self, raw: &str) -> PathBuf {
        self.resolver.resolve(raw, &self.state.current_dir)
    }

    /// Parses and runs one line. Never fails: errors come back as output.
    pub fn execute(&mut self, line: &str) -> CommandOutput {
        match Command::parse(line) {
            Ok(command) => self.run(&command),
            Err(err) => {
                self.log.failure(self.fs.as_ref(), line.trim(), &err.to_string());
                CommandOutput::with_error(None, err)
            }
        }
    }

    pub fn run(&mut self, command: &Command) -> CommandOutput {
        let kind = command.kind();
        let text = command.to_string();
        // `undo` writes its own log lines.
        let logged = !matches!(kind, CommandKind::Undo | CommandKind::Exit);

        match self.dispatch(command) {
            Ok(Reply::Done { message, history }) => {
                if kind.is_mutating() {
                    let entry = history.unwrap_or_else(|| text.clone());
                    self.history.append(self.fs.as_ref(), entry);
                }
                if logged {
                    self.log.success(self.fs.as_ref(), &text);
                }
                CommandOutput::success(Some(kind), message)
            }
            Ok(Reply::Cancelled) => {
                self.log.failure(self.fs.as_ref(), &text, "cancelled by user");
                CommandOutput::success(Some(kind), "Cancelled")
            }
            Err(err) => {
                log::debug!("{text} failed: {err:?}");
                if logged {
                    self.log.failure(self.fs.as_ref(), &text, &err.to_string());
                }
                CommandOutput::with_error(Some(kind), err)
            }
        }
    }

    fn dispatch(&mut self, command: &Command) -> crate::Result<Reply> {
        let message = match command {
            Command::List { path, long } => self.ls(path, *long)?,
            Command::ChangeDir { path } => self.cd(path)?,
            Command::Cat { file } => self.cat(file)?,
            Command::Copy { src, dst, recursive } => self.cp(src, dst, *recursive)?,
            Command::Move { src, dst } => self.mv(src, dst)?,
            Command::Remove { target, recursive } => return self.rm(target, *recursive),
            Command::Grep { pattern, path, recursive, ignore_case } => self.grep(
                pattern,
                path,
                GrepOptions { recursive: *recursive, ignore_case: *ignore_case },
            )?,
            Command::Zip { source, archive } => self.zip(source, archive)?,
            Command::Unzip { archive } => self.unzip(archive)?,
            Command::Tar { source, archive } => self.tar(source, archive)?,
            Command::Untar { archive } => self.untar(archive)?,
            Command::History { count } => self.show_history(*count),
            Command::Undo => self.undo()?,
            Command::Help => HELP_TEXT.to_string(),
            Command::Exit => "Exiting...".to_string(),
        };
        Ok(Reply::done(message))
    }

    fn ls(&self, path: &str, long: bool) -> crate::Result<String> {
        let target = self.resolve(path);
        if !self.fs.exists(&target) {
            return Err(ShellError::not_found(target));
        }
        if !self.fs.is_dir(&target) {
            return Err(ShellError::invalid_input(format!("not a directory: {}", target.display())));
        }
        let mut entries = self.fs.list_dir(&target)?;
        entries.sort();

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = base_name(&entry);
            if !long {
                lines.push(name);
                continue;
            }
            let meta = self.fs.metadata(&entry)?;
            let modified = meta
                .modified()
                .map(|time| format_local_time(time, LISTING_TIME_FORMAT))
                .unwrap_or_else(|_| "????-??-?? ??:??".to_string());
            lines.push(format!(
                "{} {:8} {modified} {name}",
                format_permissions(mode_of(&meta)),
                meta.len()
            ));
        }
        Ok(lines.join("\n"))
    }

    fn cd(&mut self, path: &str) -> crate::Result<String> {
        let target = self.resolve(path);
        if !self.fs.is_dir(&target) {
            return Err(ShellError::not_found(target));
        }
        let message = format!("Changed directory to {}", sanitize_user_path(&target));
        self.state.current_dir = target;
        Ok(message)
    }

    fn cat(&self, file: &str) -> crate::Result<String> {
        let target = self.resolve(file);
        if self.fs.is_dir(&target) {
            return Err(ShellError::IsADirectory(target));
        }
        self.fs.read_to_string(&target)
    }

    fn cp(&self, src: &str, dst: &str, recursive: bool) -> crate::Result<String> {
        let src_path = self.resolve(src);
        let dst_path = self.resolve(dst);
        if !self.fs.exists(&src_path) {
            return Err(ShellError::not_found(src_path));
        }

        if self.fs.is_dir(&src_path) {
            if !recursive {
                return Err(ShellError::IsADirectory(src_path));
            }
            self.fs.copy_tree(&src_path, &dst_path)?;
        } else {
            let dst_path = self.landing_path(&src_path, dst_path);
            self.ensure_distinct(&src_path, &dst_path)?;
            self.fs.copy_file(&src_path, &dst_path)?;
        }
        Ok(format!("Copied {src} to {dst}"))
    }

    fn mv(&self, src: &str, dst: &str) -> crate::Result<String> {
        let src_path = self.resolve(src);
        if !self.fs.exists(&src_path) {
            return Err(ShellError::not_found(src_path));
        }
        let dst_path = self.landing_path(&src_path, self.resolve(dst));
        self.ensure_distinct(&src_path, &dst_path)?;
        self.fs.rename(&src_path, &dst_path)?;
        Ok(format!("Moved {src} to {dst}"))
    }

    fn rm(&mut self, target: &str, recursive: bool) -> crate::Result<Reply> {
        let target_path = self.resolve(target);
        if is_protected(&target_path, &self.state.current_dir)
            || nests_inside(&target_path, self.trash.dir())
        {
            return Err(ShellError::ProtectedPath(target_path));
        }
        if !self.fs.exists(&target_path) {
            return Err(ShellError::not_found(target_path));
        }

        // Only trashed directories are recorded as `rm -r`; anything else is gone for good.
        let removed = Reply::Done {
            message: format!("Removed {target}"),
            history: Some(format!("{} {target}", CommandKind::Remove)),
        };
        if !self.fs.is_dir(&target_path) {
            self.fs.remove_file(&target_path)?;
            return Ok(removed);
        }

        if !recursive {
            if !self.fs.list_dir(&target_path)?.is_empty() {
                return Err(ShellError::NotEmpty(target_path));
            }
            self.fs.remove_dir(&target_path)?;
            return Ok(removed);
        }

        let question = format!("Remove directory {target} recursively? (y/n): ");
        if !self.confirm.confirm(&question) {
            return Ok(Reply::Cancelled);
        }
        let item = self.trash.put(self.fs.as_ref(), &target_path)?;
        log::info!("moved {} to {}", target_path.display(), item.trashed_path.display());
        Ok(Reply::done(format!("Removed {target} (moved to trash)")))
    }

    fn grep(&self, pattern: &str, path: &str, options: GrepOptions) -> crate::Result<String> {
        let target = self.resolve(path);
        let matches = search::grep(self.fs.as_ref(), pattern, &target, options)?;
        if matches.is_empty() {
            return Ok("No matches found".to_string());
        }
        Ok(matches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn zip(&self, source: &str, archive: &str) -> crate::Result<String> {
        let archive_path = self.resolve(&with_extension(archive, ZIP_EXTENSION));
        self.archiver.create_zip(&self.resolve(source), &archive_path)?;
        Ok(format!("ZIP archive created: {}", sanitize_user_path(&archive_path)))
    }

    fn unzip(&self, archive: &str) -> crate::Result<String> {
        let archive_path = self.existing(archive)?;
        self.archiver.extract_zip(&archive_path, &self.state.current_dir)?;
        Ok("ZIP archive extracted".to_string())
    }

    fn tar(&self, source: &str, archive: &str) -> crate::Result<String> {
        let archive_path = self.resolve(&with_extension(archive, TAR_GZ_EXTENSION));
        self.archiver.create_tar_gz(&self.resolve(source), &archive_path)?;
        Ok(format!("TAR.GZ archive created: {}", sanitize_user_path(&archive_path)))
    }

    fn untar(&self, archive: &str) -> crate::Result<String> {
        let archive_path = self.existing(archive)?;
        self.archiver.extract_tar_gz(&archive_path, &self.state.current_dir)?;
        Ok("TAR.GZ archive extracted".to_string())
    }

    fn show_history(&self, count: usize) -> String {
        let recent = self.history.recent(count);
        if recent.is_empty() {
            return "History is empty".to_string();
        }
        recent
            .iter()
            .enumerate()
            .map(|(idx, command)| format!("{}: {command}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn undo(&mut self) -> crate::Result<String> {
        let fs = self.fs.as_ref();
        let engine = UndoEngine::new(fs, &self.resolver, &self.trash);
        let outcome = match engine.undo(&mut self.history, &self.state.current_dir) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.log.failure(fs, "undo", &err.to_string());
                return Err(err);
            }
        };

        match &outcome {
            UndoOutcome::RemovedCopy { command, .. } | UndoOutcome::Restored { command, .. } => {
                self.log.success(fs, &format!("undo: {command}"));
            }
            UndoOutcome::ManualRestoreRequired { command } => {
                self.log.failure(fs, &format!("undo: {command}"), "manual restore required");
            }
            UndoOutcome::EmptyHistory | UndoOutcome::NothingToUndo => self.log.success(fs, "undo"),
        }
        Ok(outcome.to_string())
    }

    /// A file copied or moved onto an existing directory lands inside it.
    fn landing_path(&self, src: &Path, dst: PathBuf) -> PathBuf {
        if self.fs.is_dir(&dst) {
            dst.join(base_name(src))
        } else {
            dst
        }
    }

    fn ensure_distinct(&self, src: &Path, dst: &Path) -> crate::Result<()> {
        if canonical_or_relaxed(src) == canonical_or_relaxed(dst) {
            return Err(ShellError::conflict(format!(
                "{} and {} are the same file",
                src.display(),
                dst.display()
            )));
        }
        Ok(())
    }

    fn existing(&self, raw: &str) -> crate::Result<PathBuf> {
        let path = self.resolve(raw);
        if self.fs.exists(&path) {
            Ok(path)
        } else {
            Err(ShellError::not_found(path))
        }
    }
}

#[cfg(unix)]
fn mode_of(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
