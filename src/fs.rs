use crate::errors::ShellError;
use crate::helpers::canonical_or_relaxed;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Filesystem abstraction boundary for shell operations.
///
/// Every effect a command has on disk goes through this trait, so the
/// core never touches `std::fs` directly outside of `RealFileSystem`.
pub trait FileSystem: Send + Sync {
    /// Returns the current time in wall-clock format.
    fn now(&self) -> SystemTime;

    /// The invoking user's home directory, if one is known.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Returns true when path exists (follows symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Returns true when path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Reads file metadata.
    fn metadata(&self, path: &Path) -> crate::Result<Metadata>;

    /// Last modification time of a path.
    fn modified(&self, path: &Path) -> crate::Result<SystemTime>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Reads raw bytes.
    fn read(&self, path: &Path) -> crate::Result<Vec<u8>>;

    /// Reads UTF-8 text.
    fn read_to_string(&self, path: &Path) -> crate::Result<String>;

    /// Writes UTF-8 text, truncating any previous content.
    fn write_to_string(&self, path: &Path, content: &str) -> crate::Result<()>;

    /// Appends UTF-8 text, creating the file when missing.
    fn append(&self, path: &Path, content: &str) -> crate::Result<()>;

    /// Copies a single file, returning the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> crate::Result<u64>;

    /// Copies a directory tree into a destination that must not exist yet.
    fn copy_tree(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Renames/moves a path, falling back to copy + remove across devices.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;

    /// Removes a file.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Removes an empty directory.
    fn remove_dir(&self, path: &Path) -> crate::Result<()>;

    /// Removes a directory and everything below it.
    fn remove_tree(&self, path: &Path) -> crate::Result<()>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn metadata(&self, path: &Path) -> crate::Result<Metadata> {
        fs::metadata(path).map_err(|err| ShellError::io(path, err))
    }

    fn modified(&self, path: &Path) -> crate::Result<SystemTime> {
        self.metadata(path)?
            .modified()
            .map_err(|err| ShellError::io(path, err))
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| ShellError::io(path, err))
    }

    fn read(&self, path: &Path) -> crate::Result<Vec<u8>> {
        fs::read(path).map_err(|err| ShellError::io(path, err))
    }

    fn read_to_string(&self, path: &Path) -> crate::Result<String> {
        fs::read_to_string(path).map_err(|err| ShellError::io(path, err))
    }

    fn write_to_string(&self, path: &Path, content: &str) -> crate::Result<()> {
        fs::write(path, content).map_err(|err| ShellError::io(path, err))
    }

    fn append(&self, path: &Path, content: &str) -> crate::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| ShellError::io(path, err))?;
        file.write_all(content.as_bytes())
            .map_err(|err| ShellError::io(path, err))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> crate::Result<u64> {
        fs::copy(from, to).map_err(|err| ShellError::io(from, err))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> crate::Result<()> {
        if to.exists() {
            return Err(ShellError::conflict(format!(
                "destination already exists: {}",
                to.display()
            )));
        }
        if nests_inside(from, to) {
            return Err(ShellError::invalid_input(format!(
                "cannot copy {} into itself",
                from.display()
            )));
        }
        for entry in WalkDir::new(from) {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(from).to_path_buf();
                ShellError::io(path, io::Error::from(err))
            })?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|_| ShellError::InvalidInput(entry.path().display().to_string()))?;
            let target = to.join(relative);
            if entry.file_type().is_dir() {
                self.create_dir_all(&target)?;
            } else {
                self.copy_file(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        let Err(err) = fs::rename(from, to) else {
            return Ok(());
        };
        if !crosses_devices(&err) || !from.exists() {
            return Err(ShellError::io(from, err));
        }
        log::debug!(
            "rename {} -> {} failed ({err}), falling back to copy",
            from.display(),
            to.display()
        );
        if from.is_dir() {
            self.copy_tree(from, to)?;
            self.remove_tree(from)
        } else {
            self.copy_file(from, to)?;
            self.remove_file(from)
        }
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .map_err(|err| ShellError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| ShellError::io(path, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| ShellError::io(path, err))
    }

    fn remove_dir(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir(path).map_err(|err| ShellError::io(path, err))
    }

    fn remove_tree(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir_all(path).map_err(|err| ShellError::io(path, err))
    }
}

#[cfg(unix)]
fn crosses_devices(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn crosses_devices(_err: &io::Error) -> bool {
    false
}

/// True when `to` would land at or below `from`.
pub fn nests_inside(from: &Path, to: &Path) -> bool {
    let from = canonical_or_relaxed(from);
    let anchor = match (to.parent(), to.file_name()) {
        (Some(parent), Some(name)) => canonical_or_relaxed(parent).join(name),
        _ => canonical_or_relaxed(to),
    };
    anchor.starts_with(&from)
}
