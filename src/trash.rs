//! Holding area for recursively deleted directories.
//!
//! Entries are stored as `<base>_<unix seconds>`. Recovery splits on the
//! last `_`, so a base name that already ends in `_<digits>` comes back
//! shortened; there is no reserved separator to tell the two apart.

use crate::errors::ShellError;
use crate::fs::FileSystem;
use crate::helpers::{base_name, build_trash_name, split_trash_name, unix_timestamp};
use crate::models::TrashedItem;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct TrashStore {
    dir: PathBuf,
}

impl TrashStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the trash directory when absent.
    pub fn ensure(&self, fs: &dyn FileSystem) -> crate::Result<()> {
        fs.create_dir_all(&self.dir)
    }

    /// Moves `path` aside into the trash under a timestamp-suffixed name.
    pub fn put(&self, fs: &dyn FileSystem, path: &Path) -> crate::Result<TrashedItem> {
        self.ensure(fs)?;
        let original_name = base_name(path);
        let deleted_at = unix_timestamp(fs.now());
        let destination = self.dir.join(build_trash_name(&original_name, deleted_at));
        if fs.exists(&destination) {
            return Err(ShellError::conflict(format!(
                "trash entry already exists: {}",
                destination.display()
            )));
        }
        fs.rename(path, &destination)?;
        log::debug!("trashed {} as {}", path.display(), destination.display());

        let item = TrashedItem::new(destination, original_name);
        Ok(match parse_deleted_at(deleted_at) {
            Some(at) => item.with_deleted_at(at),
            None => item,
        })
    }

    /// The entry with the newest modification time, if any.
    ///
    /// This does not try to match a particular delete: with several
    /// entries in the trash it always picks the freshest one.
    pub fn latest(&self, fs: &dyn FileSystem) -> crate::Result<Option<TrashedItem>> {
        if !fs.is_dir(&self.dir) {
            return Ok(None);
        }
        let mut entries = Vec::new();
        for path in fs.list_dir(&self.dir)? {
            let modified = fs.modified(&path).unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((modified, path));
        }
        entries.sort_by_key(|(modified, path)| {
            let name = base_name(path);
            let suffix = split_trash_name(&name)
                .1
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0);
            Reverse((*modified, suffix))
        });

        Ok(entries.into_iter().next().map(|(_, path)| item_for(path)))
    }

    /// Moves a trashed entry back as `<dest_dir>/<original name>`.
    pub fn restore(
        &self,
        fs: &dyn FileSystem,
        item: &TrashedItem,
        dest_dir: &Path,
    ) -> crate::Result<PathBuf> {
        let destination = dest_dir.join(&item.original_name);
        if fs.exists(&destination) {
            return Err(ShellError::conflict(format!(
                "cannot restore over existing {}",
                destination.display()
            )));
        }
        fs.rename(&item.trashed_path, &destination)?;
        Ok(destination)
    }
}

fn item_for(trashed_path: PathBuf) -> TrashedItem {
    let name = base_name(&trashed_path);
    let (original, suffix) = split_trash_name(&name);
    let item = TrashedItem::new(trashed_path, original.to_string());
    match suffix.and_then(|s| s.parse::<u64>().ok()).and_then(parse_deleted_at) {
        Some(at) => item.with_deleted_at(at),
        None => item,
    }
}

fn parse_deleted_at(seconds: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
}
